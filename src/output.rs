use std::collections::HashSet;
use std::path::{Path, PathBuf};

use url::Url;

use crate::core::MediaVariant;

const DEFAULT_EXTENSION: &str = ".mp4";

/// Path component of a media URL, without query, fragment or `:orig`-style size suffix
fn clean_path(url: &str) -> (String, Option<String>) {
    let (path, format) = match Url::parse(url) {
        Ok(parsed) => {
            let format = parsed
                .query_pairs()
                .find(|(k, _)| k == "format")
                .map(|(_, v)| v.into_owned());
            (parsed.path().to_string(), format)
        }
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            (url[..end].to_string(), None)
        }
    };

    let last = path.rsplit('/').next().unwrap_or_default();
    let last = last.split(':').next().unwrap_or_default();
    (last.to_string(), format)
}

/// Extension (with leading dot) for a media URL, `.mp4` when nothing better is known
pub fn infer_extension(url: &str) -> String {
    let (name, format) = clean_path(url);
    if name.ends_with(".m3u8") {
        return ".m3u8".to_string();
    }
    if let Some(ext) = Path::new(&name).extension().and_then(|e| e.to_str())
        && !ext.is_empty()
    {
        return format!(".{}", ext.to_lowercase());
    }
    match format {
        Some(f) if !f.is_empty() => format!(".{}", f.to_lowercase()),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// File name a media URL would naturally be saved as
pub fn suggested_filename(url: &str) -> String {
    let (name, _) = clean_path(url);
    let name = sanitize_filename::sanitize(&name);
    if name.is_empty() {
        return format!("media{}", infer_extension(url));
    }
    if Path::new(&name).extension().is_none() {
        return format!("{}{}", name, infer_extension(url));
    }
    name
}

/// Disambiguation tags for a set of downloads.
/// A single download gets no tag; otherwise `_<kbps>kbps` or `_<index>`.
pub fn output_tags(targets: &[MediaVariant]) -> Vec<String> {
    if targets.len() <= 1 {
        return vec![String::new(); targets.len()];
    }

    let mut seen = HashSet::new();
    targets
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let tag = match v.bitrate {
                Some(b) if b > 0 => format!("_{}kbps", b / 1000),
                _ => format!("_{}", i + 1),
            };
            let tag = if seen.contains(&tag) {
                format!("{}_{}", tag, i + 1)
            } else {
                tag
            };
            seen.insert(tag.clone());
            tag
        })
        .collect()
}

/// Where a variant should be written.
///
/// - no base: `<id><tag><ext>` in the current directory
/// - existing directory: the same name inside it
/// - path with a suffix: used as is, with the tag inserted before the suffix when present
/// - anything else is treated as a directory to be created
pub fn resolve_output_path(
    base: Option<&Path>,
    post_id: &str,
    variant: &MediaVariant,
    tag: &str,
) -> PathBuf {
    let name = format!("{}{}{}", post_id, tag, infer_extension(&variant.url));

    let Some(base) = base else {
        return PathBuf::from(name);
    };

    if base.is_dir() {
        return base.join(name);
    }

    if let Some(ext) = base.extension() {
        if tag.is_empty() {
            return base.to_path_buf();
        }
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return base.with_file_name(format!("{}{}.{}", stem, tag, ext.to_string_lossy()));
    }

    base.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MediaKind;

    const ID: &str = "1956686646272790863";

    fn video(url: &str, bitrate: Option<u64>) -> MediaVariant {
        let v = MediaVariant::new(url.to_string(), MediaKind::Video);
        match bitrate {
            Some(b) => v.with_bitrate(b),
            None => v,
        }
    }

    #[test]
    fn test_infer_extension() {
        assert_eq!(
            infer_extension("https://video.twimg.com/ext_tw_video/1/pu/vid/720x1280/abc.mp4?tag=12"),
            ".mp4"
        );
        assert_eq!(
            infer_extension("https://video.twimg.com/ext_tw_video/1/pu/pl/abc.m3u8?tag=12"),
            ".m3u8"
        );
        assert_eq!(
            infer_extension("https://pbs.twimg.com/media/GYabc.jpg:orig"),
            ".jpg"
        );
        assert_eq!(
            infer_extension("https://pbs.twimg.com/media/GYabc?format=png&name=orig"),
            ".png"
        );
        assert_eq!(infer_extension("https://example.com/stream"), ".mp4");
        assert_eq!(infer_extension("not a url/clip.webm?x=1"), ".webm");
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(
            suggested_filename("https://video.twimg.com/tweet_video/GYabc.mp4"),
            "GYabc.mp4"
        );
        assert_eq!(
            suggested_filename("https://pbs.twimg.com/media/GYabc.jpg:orig"),
            "GYabc.jpg"
        );
        assert_eq!(
            suggested_filename("https://pbs.twimg.com/media/GYabc?format=jpg&name=orig"),
            "GYabc.jpg"
        );
        assert_eq!(suggested_filename("https://example.com/"), "media.mp4");
    }

    #[test]
    fn test_default_output_is_id_mp4() {
        let v = video("https://video.twimg.com/vid/1280x720/abc.mp4", Some(2176000));
        assert_eq!(
            resolve_output_path(None, ID, &v, ""),
            PathBuf::from(format!("{ID}.mp4"))
        );
    }

    #[test]
    fn test_output_into_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let v = video("https://video.twimg.com/vid/1280x720/abc.mp4", None);
        assert_eq!(
            resolve_output_path(Some(dir.path()), ID, &v, ""),
            dir.path().join(format!("{ID}.mp4"))
        );
    }

    #[test]
    fn test_output_with_suffix_is_verbatim() {
        let v = video("https://video.twimg.com/vid/1280x720/abc.mp4", None);
        let base = Path::new("clips/cat.mp4");
        assert_eq!(resolve_output_path(Some(base), ID, &v, ""), base);
        assert_eq!(
            resolve_output_path(Some(base), ID, &v, "_832kbps"),
            PathBuf::from("clips/cat_832kbps.mp4")
        );
    }

    #[test]
    fn test_output_without_suffix_is_a_directory() {
        let v = video("https://video.twimg.com/vid/1280x720/abc.mp4", None);
        assert_eq!(
            resolve_output_path(Some(Path::new("downloads/new")), ID, &v, "_2"),
            PathBuf::from(format!("downloads/new/{ID}_2.mp4"))
        );
    }

    #[test]
    fn test_output_tags() {
        let single = vec![video("https://a/x.mp4", Some(832000))];
        assert_eq!(output_tags(&single), vec![String::new()]);

        let many = vec![
            video("https://a/x.mp4", Some(256000)),
            video("https://a/y.mp4", None),
            video("https://a/z.mp4", Some(256000)),
        ];
        assert_eq!(output_tags(&many), vec!["_256kbps", "_2", "_256kbps_3"]);
        assert!(output_tags(&[]).is_empty());
    }
}
