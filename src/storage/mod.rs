//! Storage seams
//!
//! Two upload targets are involved when a PDF comes in:
//! - the inference platform's asset store, whose id is attached to agent calls
//! - public blob storage, whose URL is handed to the input router

pub mod assets;
pub mod blob;

pub use assets::AssetClient;
pub use blob::BlobClient;

use async_trait::async_trait;
use bytes::Bytes;

use crate::agents::AssetReference;
use crate::types::AppResult;

#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload_asset(&self, bytes: Bytes, filename: &str) -> AppResult<AssetReference>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the file publicly and return its URL
    async fn put(&self, bytes: Bytes, filename: &str) -> AppResult<String>;
}

/// Content type sent along with an uploaded file
pub fn content_type_for(filename: &str) -> mime::Mime {
    if filename.to_lowercase().ends_with(".pdf") {
        mime::APPLICATION_PDF
    } else {
        mime::APPLICATION_OCTET_STREAM
    }
}
