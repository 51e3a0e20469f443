//! HTTP client for the upstream download tree.
//!
//! Three document kinds live upstream: control-format `Packages` indexes,
//! `feeds.conf` feed lists, and `profiles.json` target metadata. This
//! module fetches and parses all three; everything above it works on the
//! parsed types.

use fis_schema::IndexDocument;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors from fetching or parsing upstream documents.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport-level failure (connection, timeout, decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status} for {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The status code upstream answered with.
        status: StatusCode,
    },

    /// The document was fetched but could not be parsed.
    #[error("malformed document at {url}: {message}")]
    Parse {
        /// The URL the document came from.
        url: String,
        /// What was wrong with it.
        message: String,
    },
}

impl UpstreamError {
    /// Whether this error is an upstream 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Client for the upstream download tree.
///
/// Wraps a shared connection pool with a bounded per-request timeout; every
/// request carries the crate User-Agent.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Build a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be
    /// constructed (TLS backend initialization).
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, UpstreamError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }
        Ok(resp.text().await?)
    }

    /// Fetch and parse the package index published under `url`.
    ///
    /// The index itself lives at `{url}/Packages`; callers pass the
    /// directory URL exactly as the aggregation rules construct it.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Status`] on a non-200 answer (404
    /// distinguishable via [`UpstreamError::is_not_found`]) and
    /// [`UpstreamError::Parse`] if the index text is malformed.
    pub async fn fetch_manifest(&self, url: &str) -> Result<IndexDocument, UpstreamError> {
        let index_url = format!("{}/Packages", url.trim_end_matches('/'));
        let text = self.get_text(&index_url).await?;
        parse_packages(&text).map_err(|message| UpstreamError::Parse {
            url: index_url,
            message,
        })
    }

    /// Fetch the ordered feed list for an architecture directory.
    ///
    /// Reads `{url}/feeds.conf`. The returned names are in file order,
    /// which is the merge order: feeds listed later take priority.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Status`] on a non-200 answer.
    pub async fn fetch_feeds(&self, url: &str) -> Result<Vec<String>, UpstreamError> {
        let feeds_url = format!("{}/feeds.conf", url.trim_end_matches('/'));
        let text = self.get_text(&feeds_url).await?;
        Ok(parse_feeds(&text))
    }

    /// Resolve the kmods directory name from `{url}/profiles.json`.
    ///
    /// A missing document or a profile without kernel metadata means the
    /// target publishes no separate kernel-module index; both yield
    /// `Ok(None)` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] on transport failure and
    /// [`UpstreamError::Parse`] if the document exists but is not JSON.
    pub async fn fetch_kmods_directory(&self, url: &str) -> Result<Option<String>, UpstreamError> {
        let profiles_url = format!("{}/profiles.json", url.trim_end_matches('/'));
        let resp = self.client.get(&profiles_url).send().await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let profiles: Value = resp.json().await.map_err(|err| UpstreamError::Parse {
            url: profiles_url,
            message: err.to_string(),
        })?;
        Ok(kmods_directory(&profiles))
    }
}

/// Parse a control-format package index.
///
/// Stanzas are separated by blank lines; within a stanza, `Package:` names
/// the package and `Version:` supplies its value. The first
/// `Architecture:` seen becomes the document's pass-through field. A
/// stanza without a version contributes nothing.
fn parse_packages(text: &str) -> Result<IndexDocument, String> {
    fn flush(doc: &mut IndexDocument, name: &mut Option<String>, version: &mut Option<String>) {
        if let (Some(name), Some(version)) = (name.take(), version.take()) {
            doc.packages.insert(name, Value::String(version));
        }
    }

    let mut doc = IndexDocument::default();
    let mut name: Option<String> = None;
    let mut version: Option<String> = None;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            flush(&mut doc, &mut name, &mut version);
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Package" => {
                // Tolerate a missing stanza separator before a new package.
                flush(&mut doc, &mut name, &mut version);
                name = Some(value.to_string());
            }
            "Version" => {
                if name.is_none() {
                    return Err(format!("line {}: Version before Package", lineno + 1));
                }
                version = Some(value.to_string());
            }
            "Architecture" => {
                doc.extra
                    .entry("architecture".to_string())
                    .or_insert_with(|| Value::String(value.to_string()));
            }
            _ => {}
        }
    }
    flush(&mut doc, &mut name, &mut version);

    Ok(doc)
}

/// Parse a `feeds.conf` document into an ordered list of feed names.
///
/// Lines have the form `src/gz <name> <url>`; blank lines and `#` comments
/// are skipped.
fn parse_feeds(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let _method = parts.next()?;
            parts.next().map(str::to_string)
        })
        .collect()
}

/// Assemble the kmods directory name from a `profiles.json` document:
/// `{version}-{release}-{vermagic}` of its `linux_kernel` object.
fn kmods_directory(profiles: &Value) -> Option<String> {
    let kernel = profiles.get("linux_kernel")?;
    let version = kernel_field(kernel, "version")?;
    let release = kernel_field(kernel, "release")?;
    let vermagic = kernel_field(kernel, "vermagic")?;
    Some(format!("{version}-{release}-{vermagic}"))
}

// Some trees publish `release` as a bare number.
fn kernel_field(kernel: &Value, key: &str) -> Option<String> {
    match kernel.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
