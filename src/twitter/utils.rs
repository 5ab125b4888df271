use url::Url;

use crate::error::{Result, XgrabError};

const HOSTS: &[&str] = &[
    "x.com",
    "www.x.com",
    "mobile.x.com",
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
];

fn parse_url(url: &str) -> Result<Url> {
    let url = url.trim();
    if url.is_empty() {
        return Err(XgrabError::InvalidUrl("empty URL".to_string()));
    }
    match Url::parse(url) {
        Ok(parsed) => Ok(parsed),
        // "x.com/user/status/1" has no scheme
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", url))
            .map_err(|e| XgrabError::InvalidUrl(format!("{}: {}", url, e))),
        Err(e) => Err(XgrabError::InvalidUrl(format!("{}: {}", url, e))),
    }
}

/// Extract the numeric post ID from an X/Twitter URL
pub fn parse_id(url: &str) -> Result<String> {
    let parsed = parse_url(url)?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    // /<user>/status/<id>, /i/web/status/<id>, /status/<id>/photo/1
    let mut id = segments
        .windows(2)
        .find(|w| w[0].eq_ignore_ascii_case("status") || w[0].eq_ignore_ascii_case("statuses"))
        .map(|w| w[1].to_string());

    if id.is_none() {
        id = parsed
            .query_pairs()
            .find(|(k, _)| k == "id" || k == "status")
            .map(|(_, v)| v.into_owned());
    }

    let Some(id) = id.filter(|i| !i.is_empty()) else {
        return Err(XgrabError::InvalidUrl(format!(
            "Could not extract post ID from {}. Expected .../status/<id>",
            url
        )));
    };

    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(XgrabError::InvalidUrl(format!(
            "Extracted post ID looks invalid: {}",
            id
        )));
    }

    Ok(id)
}

/// Check if URL points at X/Twitter
pub fn is_twitter_url(url: &str) -> bool {
    parse_url(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .is_some_and(|h| HOSTS.contains(&h.as_str()))
}

/// Stable page URL for a post ID
pub fn canonical_url(post_id: &str) -> String {
    format!("https://x.com/i/web/status/{}", post_id)
}
