pub mod config;
pub mod core;
pub mod download;
pub mod error;
pub mod media;
pub mod output;
pub mod twitter;
mod utils;

use std::path::PathBuf;

pub use crate::core::{DownloadPlan, MediaKind, MediaVariant, Metadata, Source, SourceKind};
pub use config::Config;
pub use error::{Result, XgrabError};
pub use twitter::{is_twitter_url, parse_id};
pub use utils::{expand_home, format_size};

use tracing::{info, warn};

/// Map source kinds to their implementations, keeping the order
pub fn sources_for(kinds: &[SourceKind]) -> Vec<&'static dyn Source> {
    kinds.iter().map(SourceKind::source).collect()
}

/// Try each source in order until one returns a usable payload
pub async fn fetch_metadata(
    client: &reqwest::Client,
    post_id: &str,
    sources: &[&dyn Source],
) -> Result<Metadata> {
    let mut errors = Vec::new();

    for source in sources {
        let kind = source.kind();
        match source.fetch(client, post_id).await {
            Ok(metadata) => {
                info!("Fetched metadata for {} from {}", post_id, kind);
                return Ok(metadata);
            }
            Err(e) => {
                warn!("{} failed: {}", kind, e);
                errors.push(format!("{}: {}", kind, e));
            }
        }
    }

    Err(XgrabError::MetadataUnavailable(if errors.is_empty() {
        "no sources configured".to_string()
    } else {
        errors.join("; ")
    }))
}

/// Resolve the media a plan refers to, without downloading anything
pub async fn resolve_media(
    client: &reqwest::Client,
    plan: &DownloadPlan,
    sources: &[&dyn Source],
) -> Result<Vec<MediaVariant>> {
    let metadata = fetch_metadata(client, &plan.post_id, sources).await?;
    media::extract_media(&metadata, plan)
}

/// Download every selected media file of a post; returns the written paths.
/// Stops at the first failed file, leaving files already written in place.
pub async fn download_post(
    client: &reqwest::Client,
    plan: &DownloadPlan,
    sources: &[&dyn Source],
    progress: bool,
) -> Result<Vec<PathBuf>> {
    let targets = resolve_media(client, plan, sources).await?;
    info!("Selected {} media file(s)", targets.len());

    let tags = output::output_tags(&targets);
    let mut outputs = Vec::with_capacity(targets.len());
    for (variant, tag) in targets.iter().zip(&tags) {
        let dest = output::resolve_output_path(plan.output.as_deref(), &plan.post_id, variant, tag);
        download::stream_to_file(client, &variant.url, &dest, plan.overwrite, progress).await?;
        outputs.push(dest);
    }
    Ok(outputs)
}
