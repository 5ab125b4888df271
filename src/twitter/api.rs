use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::download::{download_json, download_text, post_json};
use crate::error::{Result, XgrabError};
use crate::twitter::types::{GuestTokenResponse, TweetResultVariables, features_json};
use crate::twitter::utils::canonical_url;

pub const SYNDICATION_URLS: &[&str] = &[
    "https://cdn.syndication.twimg.com/widgets/tweet?id={id}",
    "https://cdn.syndication.twimg.com/widgets/tweet?id={id}&lang=en",
    "https://cdn.syndication.twimg.com/widgets/tweet?dnt=false&id={id}&lang=en",
];
pub const FXTWITTER_API: &str = "https://api.fxtwitter.com/status/{id}";
pub const VXTWITTER_API: &str = "https://api.vxtwitter.com/status/{id}";
pub const GUEST_ACTIVATE_URL: &str = "https://api.twitter.com/1.1/guest/activate.json";
pub const TWEET_RESULT_URL: &str =
    "https://twitter.com/i/api/graphql/0hWvDhmW8YQ-S_ib3azIrQ/TweetResultByRestId";

fn fill(template: &str, post_id: &str) -> String {
    template.replace("{id}", post_id)
}

/// Headers the embed widget sends; the mirrors accept them too
fn publish_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(REFERER, HeaderValue::from_static("https://publish.twitter.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://publish.twitter.com"));
    headers
}

fn html_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Fetch post JSON from the public syndication endpoint, trying each parameter permutation
pub async fn fetch_syndication(client: &reqwest::Client, post_id: &str) -> Result<Value> {
    let mut errors = Vec::new();
    for template in SYNDICATION_URLS {
        let url = fill(template, post_id);
        match download_json::<Value>(client, &url, publish_headers()).await {
            Ok(value) if !is_empty_payload(&value) => return Ok(value),
            Ok(_) => errors.push(format!("{}: empty payload", url)),
            Err(e) => {
                debug!("syndication attempt failed: {}", e);
                errors.push(e.to_string());
            }
        }
    }
    Err(XgrabError::ParseError(errors.join("; ")))
}

/// Mirrors wrap the post as `{ "tweet": {...} }`; anything else is used as is
pub fn unwrap_mirror(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.get("tweet").is_some_and(Value::is_object) => {
            map.remove("tweet").unwrap_or_default()
        }
        other => other,
    }
}

/// Fetch post JSON from a third-party mirror API (fxtwitter, vxtwitter)
pub async fn fetch_mirror(client: &reqwest::Client, template: &str, post_id: &str) -> Result<Value> {
    let url = fill(template, post_id);
    let value = unwrap_mirror(download_json::<Value>(client, &url, publish_headers()).await?);
    if is_empty_payload(&value) {
        return Err(XgrabError::ParseError(format!("{}: empty payload", url)));
    }
    Ok(value)
}

/// Obtain an anonymous guest token
pub async fn get_guest_token(client: &reqwest::Client) -> Result<String> {
    let response: GuestTokenResponse =
        post_json::<_, ()>(client, GUEST_ACTIVATE_URL, None, HeaderMap::new()).await?;
    Ok(response.guest_token)
}

/// Build the `TweetResultByRestId` request URL
pub fn tweet_result_url(post_id: &str) -> Result<String> {
    let variables = serde_json::to_string(&TweetResultVariables::new(post_id))?;
    let features = serde_json::to_string(&features_json())?;
    let url = Url::parse_with_params(
        TWEET_RESULT_URL,
        &[("variables", variables), ("features", features)],
    )
    .map_err(|e| XgrabError::ParseError(format!("cannot build GraphQL URL: {}", e)))?;
    Ok(url.to_string())
}

/// Fetch post JSON from the official GraphQL API, with a guest token when one can be had
pub async fn fetch_graphql(client: &reqwest::Client, post_id: &str) -> Result<Value> {
    let mut headers = HeaderMap::new();
    match get_guest_token(client).await {
        Ok(token) => {
            headers.insert("x-guest-token", HeaderValue::from_str(&token)?);
        }
        Err(e) => warn!("Could not get guest token: {}", e),
    }

    let url = tweet_result_url(post_id)?;
    let value: Value = download_json(client, &url, headers).await?;
    if value.get("data").is_none_or(is_empty_payload) {
        return Err(XgrabError::ParseError(
            "GraphQL response has no data".to_string(),
        ));
    }
    Ok(value)
}

/// Fetch the post page HTML
pub async fn fetch_page(client: &reqwest::Client, post_id: &str) -> Result<String> {
    download_text(client, &canonical_url(post_id), html_headers()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fill() {
        assert_eq!(
            fill(SYNDICATION_URLS[2], "42"),
            "https://cdn.syndication.twimg.com/widgets/tweet?dnt=false&id=42&lang=en"
        );
        assert_eq!(fill(FXTWITTER_API, "42"), "https://api.fxtwitter.com/status/42");
    }

    #[test]
    fn test_unwrap_mirror() {
        let wrapped = json!({"code": 200, "tweet": {"id": "42", "media": {}}});
        assert_eq!(unwrap_mirror(wrapped), json!({"id": "42", "media": {}}));

        let flat = json!({"tweetID": "42", "mediaURLs": []});
        assert_eq!(unwrap_mirror(flat.clone()), flat);

        let not_object = json!({"tweet": "gone"});
        assert_eq!(unwrap_mirror(not_object.clone()), not_object);
    }

    #[test]
    fn test_empty_payload() {
        assert!(is_empty_payload(&json!({})));
        assert!(is_empty_payload(&Value::Null));
        assert!(!is_empty_payload(&json!({"id_str": "1"})));
    }

    #[test]
    fn test_tweet_result_url() {
        let url = Url::parse(&tweet_result_url("42").unwrap()).unwrap();
        let variables = url
            .query_pairs()
            .find(|(k, _)| k == "variables")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let variables: Value = serde_json::from_str(&variables).unwrap();
        assert_eq!(variables["tweetId"], "42");
        assert!(url.query_pairs().any(|(k, _)| k == "features"));
    }

    #[tokio::test]
    async fn test_fetch_mirror_sends_publish_headers() {
        let base = crate::download::test_server::spawn(|request| {
            let body = json!({"code": 200, "tweet": {"request": request.to_lowercase()}});
            crate::download::test_server::ok_response(body.to_string().as_bytes())
        })
        .await;
        let template = base.replace("clip.mp4", "status/{id}");
        let client = crate::download::get_http_client(&Default::default()).unwrap();

        let value = fetch_mirror(&client, &template, "42").await.unwrap();
        let request = value["request"].as_str().unwrap();
        assert!(request.starts_with("get /status/42 "));
        assert!(request.contains("referer: https://publish.twitter.com/"));
        assert!(request.contains("origin: https://publish.twitter.com"));
        assert!(request.contains("accept: application/json"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_syndication() {
        let client = crate::download::get_http_client(&Default::default()).unwrap();
        let value = fetch_syndication(&client, "1956686646272790863").await.unwrap();
        assert!(value.is_object());
    }
}
