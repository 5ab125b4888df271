use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
pub use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::Result;
use crate::output::suggested_filename;
use crate::twitter::{FXTWITTER, GRAPHQL, PAGE, SYNDICATION, VXTWITTER};

/// Kind of media attached to a post
#[derive(
    EnumIter, Display, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    #[default]
    Video,
    Gif,
}

/// One downloadable rendition of a piece of media
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaVariant {
    pub url: String,
    pub kind: MediaKind,
    pub suggested_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl MediaVariant {
    pub fn new(url: String, kind: MediaKind) -> Self {
        let suggested_filename = suggested_filename(&url);
        Self {
            url,
            kind,
            suggested_filename,
            bitrate: None,
            content_type: None,
        }
    }

    /// Set bitrate in bits per second
    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_content_type(mut self, content_type: String) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Bitrate used for ranking; missing values rank lowest
    pub fn rank(&self) -> u64 {
        self.bitrate.unwrap_or(0)
    }
}

/// Everything one invocation needs to know about what to download
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadPlan {
    pub post_id: String,
    pub output: Option<PathBuf>,
    pub download_all: bool,
    pub include_m3u8: bool,
    pub include_photos: bool,
    pub overwrite: bool,
}

impl DownloadPlan {
    pub fn new(post_id: String) -> Self {
        Self {
            post_id,
            ..Default::default()
        }
    }
}

/// Metadata sources, in the default fallback order
#[derive(
    EnumIter,
    EnumString,
    Display,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Copy,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Syndication,
    FxTwitter,
    VxTwitter,
    Graphql,
    Page,
}

impl SourceKind {
    pub fn source(&self) -> &'static dyn Source {
        match self {
            SourceKind::Syndication => &SYNDICATION,
            SourceKind::FxTwitter => &FXTWITTER,
            SourceKind::VxTwitter => &VXTWITTER,
            SourceKind::Graphql => &GRAPHQL,
            SourceKind::Page => &PAGE,
        }
    }

    /// Default fallback order
    pub fn defaults() -> Vec<SourceKind> {
        SourceKind::iter().collect()
    }
}

/// Raw payload describing a post
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    Json(Value),
    Html(String),
}

/// Trait for fetching post metadata from one endpoint family
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch the payload for a post; any error lets the caller move on to the next source
    async fn fetch(&self, client: &reqwest::Client, post_id: &str) -> Result<Metadata>;
}
