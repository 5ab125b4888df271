use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XgrabError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timeout for URL: {0}")]
    RequestTimeout(String),

    #[error("HTTP error {status} for URL: {url}")]
    HttpError { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Could not fetch post metadata from any source: {0}")]
    MetadataUnavailable(String),

    #[error("No video found; the post appears to contain only photos (use --photos to download them)")]
    PhotosOnly,

    #[error("No downloadable media found in the post")]
    NoMedia,

    #[error("Destination file exists: {} (use --force to overwrite)", .0.display())]
    DestinationExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

impl XgrabError {
    /// Process exit code for this failure: 2 for bad input, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            XgrabError::InvalidUrl(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, XgrabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(XgrabError::InvalidUrl("x".into()).exit_code(), 2);
        assert_eq!(XgrabError::NoMedia.exit_code(), 1);
        assert_eq!(XgrabError::PhotosOnly.exit_code(), 1);
        assert_eq!(
            XgrabError::MetadataUnavailable("all failed".into()).exit_code(),
            1
        );
    }

    #[test]
    fn test_photos_only_message_is_distinct() {
        let photos = XgrabError::PhotosOnly.to_string();
        let none = XgrabError::NoMedia.to_string();
        assert!(photos.contains("only photos"));
        assert_ne!(photos, none);
    }
}
