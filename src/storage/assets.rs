// Asset uploads to the inference platform

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use serde_json::Value;
use tracing::{debug, info};

use super::{content_type_for, AssetUploader};
use crate::agents::AssetReference;
use crate::types::{AppError, AppResult};

pub const ASSET_UPLOAD_PATH: &str = "/v3/assets/upload";
const FILE_FIELD: &str = "files";

#[derive(Clone)]
pub struct AssetClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AssetClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

/// Pull `results[0].asset_id` out of an upload response
fn extract_asset_id(body: &Value) -> Option<AssetReference> {
    body.pointer("/results/0/asset_id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(AssetReference::new)
}

#[async_trait]
impl AssetUploader for AssetClient {
    async fn upload_asset(&self, bytes: Bytes, filename: &str) -> AppResult<AssetReference> {
        info!(filename = %filename, size = bytes.len(), "Uploading asset");

        let part = multipart::Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type_for(filename).as_ref())?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, ASSET_UPLOAD_PATH))
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::upstream("Asset upload", status, text));
        }

        let body: Value = serde_json::from_str(&text)?;
        debug!(response = %body, "Asset upload response");

        let asset = extract_asset_id(&body).ok_or_else(|| AppError::MissingAssetId(body.to_string()))?;
        info!(asset_id = %asset, "Asset uploaded");
        Ok(asset)
    }
}
