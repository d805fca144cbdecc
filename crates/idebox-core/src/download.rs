//! IDE artifact download with a local cache
//!
//! Artifacts are cached under `<cache_root>/artifacts/<hash>/` keyed by a
//! hash of the URL, so repeated builds of the same IDE type never re-fetch.
//! Fetch strategies are tried in order: the built-in HTTP client first,
//! then the system `curl` as a fallback for URLs the client chokes on.

use crate::{CoreError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// One way of fetching a URL to a local file
#[async_trait]
pub trait Fetcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch `url` into `dest`. On error the caller removes any partial file.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Fetcher backed by reqwest
pub struct HttpFetcher;

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let resp = reqwest::get(url)
            .await
            .map_err(|e| CoreError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP request failed: {}", e),
            })?;

        if !resp.status().is_success() {
            return Err(CoreError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP {} from {}", resp.status(), url),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| CoreError::DownloadFailed {
            url: url.to_string(),
            reason: format!("Failed to read response body: {}", e),
        })?;

        std::fs::write(dest, &bytes)?;
        Ok(())
    }
}

/// Fetcher that shells out to the system curl
pub struct CurlFetcher;

#[async_trait]
impl Fetcher for CurlFetcher {
    fn name(&self) -> &'static str {
        "curl"
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let dest_str = dest.to_string_lossy().to_string();
        let output = Command::new("curl")
            .args(["-fsSL", "-o", &dest_str, url])
            .output()
            .await
            .map_err(|e| CoreError::DownloadFailed {
                url: url.to_string(),
                reason: format!("Failed to spawn curl: {}", e),
            })?;

        if !output.status.success() {
            return Err(CoreError::DownloadFailed {
                url: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Cache path for a URL's artifact, without fetching
pub fn cached_artifact_path(url: &str, cache_root: &Path) -> PathBuf {
    cache_root
        .join("artifacts")
        .join(artifact_cache_key(url))
        .join(artifact_file_name(url))
}

/// Download an artifact into the cache, or return the cached copy.
///
/// Returns the path to the cached file.
pub async fn fetch_artifact(url: &str, cache_root: &Path) -> Result<PathBuf> {
    let fetchers: Vec<Box<dyn Fetcher>> = vec![Box::new(HttpFetcher), Box::new(CurlFetcher)];
    fetch_artifact_with(url, cache_root, &fetchers).await
}

/// Inner fetch with explicit strategies, for testing
pub async fn fetch_artifact_with(
    url: &str,
    cache_root: &Path,
    fetchers: &[Box<dyn Fetcher>],
) -> Result<PathBuf> {
    let dest = cached_artifact_path(url, cache_root);
    if dest.exists() {
        tracing::debug!("Artifact cached at {}", dest.display());
        return Ok(dest);
    }

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut last_err = CoreError::DownloadFailed {
        url: url.to_string(),
        reason: "no fetch strategy available".to_string(),
    };

    for fetcher in fetchers {
        tracing::info!("Fetching {} via {}", url, fetcher.name());
        match fetcher.fetch(url, &dest).await {
            Ok(()) => return Ok(dest),
            Err(e) => {
                tracing::warn!("Fetch via {} failed: {}", fetcher.name(), e);
                // Drop any partial file before the next attempt
                let _ = std::fs::remove_file(&dest);
                last_err = e;
            }
        }
    }

    Err(last_err)
}

/// File name component of a URL, or a fixed name when the URL has none
fn artifact_file_name(url: &str) -> String {
    let tail = url.rsplit('/').next().unwrap_or("");
    let name = tail.split('?').next().unwrap_or("");
    if name.is_empty() {
        "artifact".to_string()
    } else {
        name.to_string()
    }
}

fn artifact_cache_key(url: &str) -> String {
    format!("{:016x}", fnv1a64(url))
}

fn fnv1a64(input: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for b in input.as_bytes() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
