use std::collections::HashSet;

use regex::Regex;

use crate::core::{MediaKind, MediaVariant};
use crate::error::Result;

const VIDEO_PATTERNS: &[&str] = &[
    r#""video_url":"([^"]*\.mp4[^"]*)""#,
    r#""playback_url":"([^"]*\.mp4[^"]*)""#,
    r#""content_url":"([^"]*\.mp4[^"]*)""#,
];

const GIF_PATTERNS: &[&str] = &[r#"href="([^"]*\.mp4[^"]*)""#, r#"src="([^"]*\.mp4[^"]*)""#];

const IMAGE_PATTERNS: &[&str] = &[
    r#""media_url_https":"([^"]*\.(?:jpg|jpeg|png|gif)[^"]*)""#,
    r#"href="([^"]*\.(?:jpg|jpeg|png|gif)[^"]*)""#,
    r#"src="([^"]*\.(?:jpg|jpeg|png|gif)[^"]*)""#,
];

fn decode(raw: &str) -> String {
    let unescaped = raw.replace("\\/", "/").replace("&amp;", "&");
    let decoded = urlencoding::decode(&unescaped).map(|s| s.into_owned()).ok();
    decoded.unwrap_or(unescaped)
}

fn matches(patterns: &[&str], html: &str) -> Result<Vec<String>> {
    let mut found = Vec::new();
    for pattern in patterns {
        let re = Regex::new(pattern)?;
        found.extend(
            re.captures_iter(html)
                .filter_map(|c| c.get(1))
                .map(|m| decode(m.as_str()))
                .filter(|u| u.starts_with("http")),
        );
    }
    Ok(found)
}

/// Request the original-size rendition of a `pbs.twimg.com/media/` image
pub fn original_size(url: &str) -> String {
    if !url.contains("pbs.twimg.com/media/") || url.ends_with(":orig") || url.contains("name=") {
        return url.to_string();
    }
    if url.contains('?') {
        format!("{}&name=orig", url)
    } else {
        format!("{}:orig", url)
    }
}

/// Scrape media URLs out of a post page, in discovery order without duplicates
pub fn extract_from_html(html: &str) -> Result<Vec<MediaVariant>> {
    let mut media = Vec::new();

    for url in matches(VIDEO_PATTERNS, html)? {
        media.push(MediaVariant::new(url, MediaKind::Video));
    }

    for url in matches(GIF_PATTERNS, html)? {
        if url.contains("video") {
            media.push(MediaVariant::new(url, MediaKind::Gif));
        }
    }

    for url in matches(IMAGE_PATTERNS, html)? {
        media.push(MediaVariant::new(original_size(&url), MediaKind::Photo));
    }

    let mut seen = HashSet::new();
    media.retain(|m| seen.insert(m.url.clone()));
    Ok(media)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><head>
<meta property="og:image" content="https://pbs.twimg.com/profile_images/1/a.jpg">
<script>{"video_url":"https:\/\/video.twimg.com\/ext_tw_video\/1\/pu\/vid\/720x1280\/a.mp4?tag=12","media_url_https":"https:\/\/pbs.twimg.com\/media\/GYabc.jpg"}</script>
<video src="https://video.twimg.com/tweet_video/GYgif.mp4"></video>
<a href="https://example.com/clip.mp4">not a twitter video</a>
<img src="https://pbs.twimg.com/media/GYabc.jpg">
<img src="/relative/logo.png">
</head></html>
"#;

    #[test]
    fn test_extract_from_html() {
        let media = extract_from_html(PAGE).unwrap();
        let urls: Vec<(&str, MediaKind)> = media.iter().map(|m| (m.url.as_str(), m.kind)).collect();
        assert_eq!(
            urls,
            vec![
                (
                    "https://video.twimg.com/ext_tw_video/1/pu/vid/720x1280/a.mp4?tag=12",
                    MediaKind::Video
                ),
                ("https://video.twimg.com/tweet_video/GYgif.mp4", MediaKind::Gif),
                ("https://pbs.twimg.com/media/GYabc.jpg:orig", MediaKind::Photo),
            ]
        );
    }

    #[test]
    fn test_original_size() {
        assert_eq!(
            original_size("https://pbs.twimg.com/media/GYabc.jpg"),
            "https://pbs.twimg.com/media/GYabc.jpg:orig"
        );
        assert_eq!(
            original_size("https://pbs.twimg.com/media/GYabc.jpg:orig"),
            "https://pbs.twimg.com/media/GYabc.jpg:orig"
        );
        assert_eq!(
            original_size("https://pbs.twimg.com/media/GYabc?format=jpg"),
            "https://pbs.twimg.com/media/GYabc?format=jpg&name=orig"
        );
        assert_eq!(
            original_size("https://pbs.twimg.com/media/GYabc?format=jpg&name=small"),
            "https://pbs.twimg.com/media/GYabc?format=jpg&name=small"
        );
        assert_eq!(
            original_size("https://pbs.twimg.com/profile_images/1/a.jpg"),
            "https://pbs.twimg.com/profile_images/1/a.jpg"
        );
    }

    #[test]
    fn test_empty_page() {
        assert!(extract_from_html("<html></html>").unwrap().is_empty());
    }
}
