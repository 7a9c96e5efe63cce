//! Model downloading
//!
//! Fetches the U2-Net ONNX exports into the model cache. Downloads stream into
//! a `.part` file next to the destination and are renamed into place only after
//! the body is complete (and, when a digest is supplied, verified).

use crate::cache::ModelCache;
use crate::error::{RemovalError, Result};
use crate::models::ModelKind;
use futures_util::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Model downloader backed by a `ModelCache`
#[derive(Debug)]
pub struct ModelDownloader {
    client: Client,
    cache: ModelCache,
}

impl ModelDownloader {
    /// Create a downloader for an existing cache
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn with_cache(cache: ModelCache) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(600))
            .build()
            .map_err(|e| RemovalError::download(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, cache })
    }

    /// Return the cached model path, downloading it from `url` first if needed
    ///
    /// # Errors
    /// - Network errors or non-success HTTP status
    /// - File system errors while writing the cache
    /// - Digest mismatch when `expected_sha256` is given
    pub async fn ensure_model(
        &self,
        kind: ModelKind,
        url: &str,
        expected_sha256: Option<&str>,
    ) -> Result<PathBuf> {
        let target = self.cache.model_path(kind);
        if self.cache.is_model_cached(kind) {
            log::info!("Model already cached: {}", target.display());
            return Ok(target);
        }

        log::info!("Downloading {} model from: {}", kind, url);
        let part = target.with_extension("onnx.part");
        let digest = match self.download_file(url, &part).await {
            Ok(digest) => digest,
            Err(e) => {
                let _ = fs::remove_file(&part);
                return Err(e);
            },
        };

        Self::finalize_download(&part, &target, &digest, expected_sha256)?;
        log::info!("Model cached at {} (sha256 {})", target.display(), digest);
        Ok(target)
    }

    /// Stream `url` into `local_path`, returning the hex SHA-256 of the body
    async fn download_file(&self, url: &str, local_path: &Path) -> Result<String> {
        log::debug!("Downloading: {} -> {}", url, local_path.display());

        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RemovalError::file_io_error("create directory", parent, &e))?;
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RemovalError::download(format!(
                "HTTP error {} for {}",
                response.status(),
                url
            )));
        }

        let total_size = response.content_length();
        let mut file = tokio::fs::File::create(local_path)
            .await
            .map_err(|e| RemovalError::file_io_error("create file", local_path, &e))?;

        let mut hasher = Sha256::new();
        let mut downloaded = 0u64;
        let mut next_report = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| RemovalError::file_io_error("write to file", local_path, &e))?;
            downloaded += chunk.len() as u64;

            if downloaded >= next_report {
                match total_size {
                    Some(total) => log::debug!("Downloaded {downloaded}/{total} bytes"),
                    None => log::debug!("Downloaded {downloaded} bytes"),
                }
                next_report = downloaded + 16 * 1024 * 1024;
            }
        }

        file.flush()
            .await
            .map_err(|e| RemovalError::file_io_error("flush file", local_path, &e))?;

        if downloaded == 0 {
            return Err(RemovalError::download(format!("Empty response body from {}", url)));
        }

        log::debug!("Downloaded {} bytes to {}", downloaded, local_path.display());
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Move a completed `.part` file into place once its digest checks out
    ///
    /// On mismatch the partial file is deleted and nothing lands at `target`.
    fn finalize_download(
        part: &Path,
        target: &Path,
        actual_sha256: &str,
        expected_sha256: Option<&str>,
    ) -> Result<()> {
        if let Some(expected) = expected_sha256 {
            if !actual_sha256.eq_ignore_ascii_case(expected) {
                let _ = fs::remove_file(part);
                return Err(RemovalError::download(format!(
                    "SHA-256 mismatch for {}: expected {}, got {}",
                    target.display(),
                    expected,
                    actual_sha256
                )));
            }
        }

        fs::rename(part, target)
            .map_err(|e| RemovalError::file_io_error("move downloaded model", target, &e))
    }

    /// Get the model cache for other operations
    #[must_use]
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}
