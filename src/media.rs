use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{DownloadPlan, MediaKind, MediaVariant, Metadata};
use crate::error::{Result, XgrabError};
use crate::twitter::scrape::{extract_from_html, original_size};

fn kind_from_type(t: &str) -> Option<MediaKind> {
    match t.to_ascii_lowercase().as_str() {
        "animated_gif" | "gif" => Some(MediaKind::Gif),
        "video" => Some(MediaKind::Video),
        "photo" | "image" => Some(MediaKind::Photo),
        _ => None,
    }
}

fn parse_bitrate(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field<'a>(node: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| node.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

fn variant_from_object(node: &Map<String, Value>, kind: MediaKind) -> Option<MediaVariant> {
    let url = str_field(node, &["src", "url"])?;
    let mut variant = MediaVariant::new(url.to_string(), kind);
    if let Some(bitrate) = ["bitrate", "bit_rate"]
        .iter()
        .find_map(|k| node.get(*k).and_then(parse_bitrate))
    {
        variant = variant.with_bitrate(bitrate);
    }
    if let Some(ct) = str_field(node, &["type", "content_type"]) {
        variant = variant.with_content_type(ct.to_string());
    }
    Some(variant)
}

fn looks_like_video_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.ends_with(".mp4") || path.ends_with(".m3u8")
}

fn walk_media(node: &Value, hint: MediaKind, groups: &mut Vec<Vec<MediaVariant>>) {
    match node {
        Value::Object(map) => {
            let own_kind = map
                .get("type")
                .and_then(Value::as_str)
                .and_then(kind_from_type);
            let kind = match own_kind.unwrap_or(hint) {
                MediaKind::Photo => MediaKind::Video,
                k => k,
            };

            if let Some(Value::Array(items)) = map.get("variants") {
                let group: Vec<MediaVariant> = items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|item| variant_from_object(item, kind))
                    .collect();
                if !group.is_empty() {
                    groups.push(group);
                }
            } else if matches!(own_kind, Some(MediaKind::Video | MediaKind::Gif))
                && let Some(url) = str_field(map, &["url"]).filter(|u| looks_like_video_url(u))
            {
                // Mirror APIs list a ready-to-use URL without renditions
                groups.push(vec![MediaVariant::new(url.to_string(), kind)]);
            }

            for child in map.values() {
                walk_media(child, kind, groups);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_media(item, hint, groups);
            }
        }
        _ => {}
    }
}

/// Drop URLs already seen, keeping first discovery; empty groups disappear
fn dedup_groups(groups: Vec<Vec<MediaVariant>>) -> Vec<Vec<MediaVariant>> {
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .filter(|v| seen.insert(v.url.clone()))
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect()
}

/// Video/GIF renditions found anywhere in a JSON payload, one group per media item
pub fn gather_media(value: &Value) -> Vec<Vec<MediaVariant>> {
    let mut groups = Vec::new();
    walk_media(value, MediaKind::Video, &mut groups);
    dedup_groups(groups)
}

/// Every video/GIF rendition in a JSON payload, in discovery order
pub fn gather_variants(value: &Value) -> Vec<MediaVariant> {
    gather_media(value).into_iter().flatten().collect()
}

fn walk_photos(node: &Value, in_photos: bool, out: &mut Vec<MediaVariant>) {
    match node {
        Value::Object(map) => {
            let is_photo = map
                .get("type")
                .and_then(Value::as_str)
                .and_then(kind_from_type)
                == Some(MediaKind::Photo);
            if (is_photo || in_photos)
                && let Some(url) = str_field(map, &["media_url_https", "url"])
                && url.starts_with("http")
            {
                out.push(MediaVariant::new(original_size(url), MediaKind::Photo));
            }
            for (key, child) in map {
                walk_photos(child, key == "photos", out);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk_photos(item, in_photos, out);
            }
        }
        _ => {}
    }
}

/// Photos found in a JSON payload, original size, without duplicates
pub fn gather_photos(value: &Value) -> Vec<MediaVariant> {
    let mut photos = Vec::new();
    walk_photos(value, false, &mut photos);
    let mut seen = HashSet::new();
    photos.retain(|p| seen.insert(p.url.clone()));
    photos
}

/// Keep MP4 renditions, plus HLS playlists when asked for
pub fn filter_variants(variants: Vec<MediaVariant>, include_m3u8: bool) -> Vec<MediaVariant> {
    variants
        .into_iter()
        .filter(|v| {
            let ct = v.content_type.as_deref().unwrap_or_default().to_lowercase();
            if ct.contains("mp4") || (include_m3u8 && ct.contains("mpegurl")) {
                return true;
            }
            let path = v.url.split(['?', '#']).next().unwrap_or_default();
            if path.ends_with(".mp4") {
                return true;
            }
            include_m3u8 && (v.url.contains(".m3u8") || v.url.contains("mpegurl"))
        })
        .collect()
}

/// Stable sort by ascending bitrate; missing bitrates rank as zero
pub fn rank_variants(mut variants: Vec<MediaVariant>) -> Vec<MediaVariant> {
    variants.sort_by_key(MediaVariant::rank);
    variants
}

/// Highest-bitrate variant; on ties the one discovered last wins
pub fn pick_best_variant(variants: Vec<MediaVariant>) -> Option<MediaVariant> {
    rank_variants(variants).pop()
}

/// The best variant, or every variant by ascending bitrate when `all` is set
pub fn select_variants(variants: Vec<MediaVariant>, all: bool) -> Vec<MediaVariant> {
    if all {
        rank_variants(variants)
    } else {
        pick_best_variant(variants).into_iter().collect()
    }
}

fn split_scraped(html: &str) -> Result<(Vec<Vec<MediaVariant>>, Vec<MediaVariant>)> {
    let (photos, videos): (Vec<_>, Vec<_>) = extract_from_html(html)?
        .into_iter()
        .partition(|m| m.kind == MediaKind::Photo);
    Ok((videos.into_iter().map(|v| vec![v]).collect(), photos))
}

/// Turn a metadata payload into the list of files to download
pub fn extract_media(metadata: &Metadata, plan: &DownloadPlan) -> Result<Vec<MediaVariant>> {
    let (groups, photos) = match metadata {
        Metadata::Json(value) => (gather_media(value), gather_photos(value)),
        Metadata::Html(html) => split_scraped(html)?,
    };
    debug!(
        "Found {} media item(s) with renditions and {} photo(s)",
        groups.len(),
        photos.len()
    );

    let mut selected: Vec<MediaVariant> = groups
        .into_iter()
        .map(|group| filter_variants(group, plan.include_m3u8))
        .filter(|group| !group.is_empty())
        .flat_map(|group| select_variants(group, plan.download_all))
        .collect();

    if selected.is_empty() {
        if photos.is_empty() {
            return Err(XgrabError::NoMedia);
        }
        if !plan.include_photos {
            return Err(XgrabError::PhotosOnly);
        }
    }

    if plan.include_photos {
        selected.extend(photos);
    }
    Ok(selected)
}
