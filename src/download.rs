use std::io::Write as _;
use std::path::Path;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{Result, XgrabError};
use crate::utils::format_size;

/// Build the shared HTTP client with browser-like default headers
pub fn get_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .default_headers(get_default_headers(config)?)
        .cookie_store(true)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Get default headers for requests
fn get_default_headers(config: &HttpConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    Ok(headers)
}

fn map_send_error(url: &str, e: reqwest::Error) -> XgrabError {
    if e.is_timeout() {
        XgrabError::RequestTimeout(url.to_string())
    } else {
        XgrabError::NetworkError(e)
    }
}

fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(XgrabError::HttpError {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

/// Execute HTTP request with error handling
async fn execute_request(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: &str,
    headers: HeaderMap,
) -> Result<reqwest::Response> {
    debug!("{} {}", method, url);
    let response = client
        .request(method, url)
        .headers(headers)
        .send()
        .await
        .map_err(|e| map_send_error(url, e))?;
    check_status(url, response)
}

/// Download text content from URL with custom headers
pub async fn download_text(client: &reqwest::Client, url: &str, headers: HeaderMap) -> Result<String> {
    let response = execute_request(client, reqwest::Method::GET, url, headers).await?;
    response.text().await.map_err(XgrabError::from)
}

/// Download and parse JSON response with custom headers.
/// The body is read as text first so a blocked request that answers with HTML
/// shows up as a parse error naming the first bytes.
pub async fn download_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<T> {
    let body = download_text(client, url, headers).await?;
    serde_json::from_str(&body).map_err(|e| {
        let snippet: String = body.chars().take(200).collect();
        XgrabError::ParseError(format!(
            "invalid JSON from {}: {} (first bytes: {:?})",
            url,
            e,
            snippet.replace('\n', " ")
        ))
    })
}

/// Execute POST request with optional JSON body and custom headers
pub async fn post_json<T: DeserializeOwned, B: Serialize>(
    client: &reqwest::Client,
    url: &str,
    body: Option<&B>,
    headers: HeaderMap,
) -> Result<T> {
    debug!("POST {}", url);
    let mut request = client.post(url).headers(headers);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await.map_err(|e| map_send_error(url, e))?;
    let response = check_status(url, response)?;
    response.json::<T>().await.map_err(XgrabError::from)
}

/// Refuse to clobber an existing file unless asked to
pub fn check_destination(dest: &Path, overwrite: bool) -> Result<()> {
    if dest.exists() && !overwrite {
        return Err(XgrabError::DestinationExists(dest.to_path_buf()));
    }
    Ok(())
}

fn report_progress(name: &str, downloaded: u64, total: Option<u64>) {
    let mut stderr = std::io::stderr();
    let _ = match total {
        Some(total) => write!(
            stderr,
            "\rDownloading {}: {:5.1}% ({}/{})",
            name,
            downloaded as f64 / total as f64 * 100.0,
            format_size(Some(downloaded)),
            format_size(Some(total))
        ),
        None => write!(
            stderr,
            "\rDownloading {}: {}",
            name,
            format_size(Some(downloaded))
        ),
    };
    let _ = stderr.flush();
}

/// Stream `url` into `dest`.
///
/// The body goes into a temporary file next to `dest` which is renamed into
/// place once complete, so an interrupted transfer never leaves a truncated
/// file under the final name.
pub async fn stream_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    overwrite: bool,
    progress: bool,
) -> Result<u64> {
    check_destination(dest, overwrite)?;

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent).await?;

    let response = execute_request(client, reqwest::Method::GET, url, HeaderMap::new()).await?;
    let total = response.content_length().filter(|n| *n > 0);

    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".part")
        .tempfile_in(&parent)?;
    let mut file = tokio::fs::File::from_std(tmp.reopen()?);

    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| XgrabError::DownloadFailed(format!("{}: {}", url, e)))?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        if progress {
            report_progress(&name, downloaded, total);
        }
    }
    file.flush().await?;
    drop(file);

    if progress {
        eprintln!();
    }

    if let Some(total) = total
        && downloaded < total
    {
        return Err(XgrabError::DownloadFailed(format!(
            "{}: received {} of {} bytes",
            url, downloaded, total
        )));
    }

    let persisted = if overwrite {
        tmp.persist(dest)
    } else {
        tmp.persist_noclobber(dest)
    };
    persisted.map_err(|e| match e.error.kind() {
        std::io::ErrorKind::AlreadyExists => XgrabError::DestinationExists(dest.to_path_buf()),
        _ => XgrabError::IoError(e.error),
    })?;

    debug!("Wrote {} bytes to {}", downloaded, dest.display());
    Ok(downloaded)
}
