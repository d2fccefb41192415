// Public blob storage for uploaded source files

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::info;

use super::{content_type_for, BlobStore};
use crate::types::{AppError, AppResult};

const BLOB_API_VERSION: &str = "7";

#[derive(Debug, Deserialize)]
struct PutBlobResponse {
    url: Option<String>,
}

#[derive(Clone)]
pub struct BlobClient {
    client: Client,
    base_url: String,
    token: String,
}

impl BlobClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// `{base}/{filename}` with the filename encoded as a single path segment
    fn object_url(&self, filename: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(format!("Invalid blob storage URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal(format!("Blob storage URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(filename.trim_start_matches('/'));
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for BlobClient {
    async fn put(&self, bytes: Bytes, filename: &str) -> AppResult<String> {
        info!(filename = %filename, size = bytes.len(), "Storing file in blob storage");

        let response = self
            .client
            .put(self.object_url(filename)?)
            .bearer_auth(&self.token)
            .header("x-api-version", BLOB_API_VERSION)
            .header("x-add-random-suffix", "1")
            .header("x-content-type", content_type_for(filename).as_ref())
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::upstream("Blob upload", status, text));
        }

        let body: PutBlobResponse = serde_json::from_str(&text)?;
        let url = body
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Internal(format!("Blob storage returned no URL: {}", text)))?;

        info!(url = %url, "File stored in blob storage");
        Ok(url)
    }
}
