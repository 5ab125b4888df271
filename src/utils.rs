use std::path::{Path, PathBuf};

/// Human readable byte count, e.g. `1.5 MB`
pub fn format_size(num_bytes: Option<u64>) -> String {
    let Some(num_bytes) = num_bytes.filter(|n| *n > 0) else {
        return "unknown".to_string();
    };
    let mut size = num_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(None), "unknown");
        assert_eq!(format_size(Some(0)), "unknown");
        assert_eq!(format_size(Some(512)), "512.0 B");
        assert_eq!(format_size(Some(1536)), "1.5 KB");
        assert_eq!(format_size(Some(5 * 1024 * 1024)), "5.0 MB");
        assert_eq!(format_size(Some(3 * 1024 * 1024 * 1024)), "3.0 GB");
        assert_eq!(format_size(Some(2 * 1024 * 1024 * 1024 * 1024)), "2.0 TB");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("out/a.mp4")), PathBuf::from("out/a.mp4"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/videos")), home.join("videos"));
        }
    }
}
