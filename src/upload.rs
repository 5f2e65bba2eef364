//! Image uploads to the Cloudinary unsigned upload endpoint.

use anyhow::Context as _;
use reqwest::multipart;

use crate::config::AssetHostConfig;
use crate::error::UploadError;

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("read: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_owned());
        Ok(Self {
            content_type: guess_content_type(&file_name).map(str::to_owned),
            file_name,
            bytes,
        })
    }
}

fn guess_content_type(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Every successful call creates a new remote asset; nothing is ever deleted.
#[derive(Debug, Clone)]
pub struct AssetUploader {
    client: reqwest::Client,
    config: Option<AssetHostConfig>,
}

impl AssetUploader {
    pub fn new(client: reqwest::Client, config: Option<AssetHostConfig>) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn endpoint(config: &AssetHostConfig) -> String {
        let base = config.api_base.trim_end_matches('/');
        format!("{base}/{}/image/upload", config.cloud_name)
    }

    pub async fn upload(&self, image: ImageFile) -> Result<String, UploadError> {
        let Some(config) = &self.config else {
            tracing::error!("missing asset host credentials; set CLOUDINARY_CLOUD_NAME and CLOUDINARY_UPLOAD_PRESET");
            return Err(UploadError::MissingConfig);
        };

        let mut file_part = multipart::Part::bytes(image.bytes).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            file_part = file_part.mime_str(content_type)?;
        }
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("upload_preset", config.upload_preset.clone());

        let endpoint = Self::endpoint(config);
        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .inspect_err(|err| tracing::error!(%endpoint, error = %err, "upload failed"))?;

        let status = response.status();
        let raw = response.text().await?;
        let body: Option<serde_json::Value> = serde_json::from_str(&raw).ok();
        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(|v| v.pointer("/error/message"))
                .and_then(|v| v.as_str())
                .map(str::to_owned)
                .unwrap_or(raw);
            tracing::error!(%status, %message, "asset host rejected upload");
            return Err(UploadError::Rejected { status, message });
        }

        let url = body
            .as_ref()
            .and_then(|v| v.get("secure_url"))
            .and_then(|v| v.as_str())
            .filter(|url| !url.is_empty())
            .ok_or(UploadError::MissingUrl)?
            .to_owned();
        tracing::info!(file = %image.file_name, %url, "image uploaded");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_uses_cloud_name() {
        let config = AssetHostConfig {
            cloud_name: "demo".to_owned(),
            upload_preset: "unsigned".to_owned(),
            api_base: "https://api.cloudinary.com/v1_1/".to_owned(),
        };
        assert_eq!(
            AssetUploader::endpoint(&config),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(guess_content_type("me.JPG"), Some("image/jpeg"));
        assert_eq!(guess_content_type("logo.png"), Some("image/png"));
        assert_eq!(guess_content_type("notes"), None);
    }

    #[tokio::test]
    async fn missing_config_fails_without_request() {
        let uploader = AssetUploader::new(reqwest::Client::new(), None);
        let err = uploader
            .upload(ImageFile {
                file_name: "me.png".to_owned(),
                content_type: None,
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingConfig));
    }
}
