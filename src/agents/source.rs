//! Content sources
//!
//! The pipeline only differs by how a submission turns into the first agent
//! message and the asset references attached to the routing and extraction
//! calls. Uploaded files go through the asset store and blob storage; URLs
//! are passed along as their own asset reference.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use super::AssetReference;
use crate::storage::{AssetUploader, BlobStore};
use crate::types::AppResult;

/// What the input router receives
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedInput {
    pub router_message: String,
    pub assets: Vec<AssetReference>,
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short description for logs
    fn describe(&self) -> String;

    async fn prepare(&self) -> AppResult<PreparedInput>;
}

/// A file uploaded by the user
pub struct UploadedFile {
    bytes: Bytes,
    filename: String,
    assets: Arc<dyn AssetUploader>,
    blobs: Arc<dyn BlobStore>,
}

impl UploadedFile {
    pub fn new(
        bytes: Bytes,
        filename: impl Into<String>,
        assets: Arc<dyn AssetUploader>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            assets,
            blobs,
        }
    }
}

#[async_trait]
impl ContentSource for UploadedFile {
    fn describe(&self) -> String {
        format!("file {} ({} bytes)", self.filename, self.bytes.len())
    }

    async fn prepare(&self) -> AppResult<PreparedInput> {
        let asset = self.assets.upload_asset(self.bytes.clone(), &self.filename).await?;
        let blob_url = self.blobs.put(self.bytes.clone(), &self.filename).await?;
        info!(asset_id = %asset, blob_url = %blob_url, "Uploaded file prepared");

        Ok(PreparedInput {
            router_message: blob_url,
            assets: vec![asset],
        })
    }
}

/// A web page or video URL submitted by the user
pub struct SubmittedUrl {
    url: String,
}

impl SubmittedUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl ContentSource for SubmittedUrl {
    fn describe(&self) -> String {
        format!("url {}", self.url)
    }

    async fn prepare(&self) -> AppResult<PreparedInput> {
        Ok(PreparedInput {
            router_message: url_router_message(&self.url),
            assets: vec![AssetReference::new(self.url.clone())],
        })
    }
}

pub fn url_router_message(url: &str) -> String {
    format!("Prepare study materials from this URL: {}", url)
}
