use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;

use super::{DocKey, DocumentStore};

/// Stores each document as `<base_dir>/documents/<namespace>/<name>.json`.
#[derive(Debug, Clone)]
pub struct LocalFsDocumentStore {
    base_dir: PathBuf,
}

impl LocalFsDocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn documents_dir(&self) -> PathBuf {
        self.base_dir.join("documents")
    }

    pub fn document_path(&self, key: &DocKey) -> anyhow::Result<PathBuf> {
        key.validate()?;
        Ok(self
            .documents_dir()
            .join(&key.namespace)
            .join(format!("{}.json", key.name)))
    }
}

#[async_trait]
impl DocumentStore for LocalFsDocumentStore {
    async fn get(&self, key: &DocKey) -> anyhow::Result<Option<Value>> {
        let path = self.document_path(key)?;
        read_json(&path)
            .await
            .with_context(|| format!("read: {}", path.display()))
    }

    async fn put(&self, key: &DocKey, document: &Value) -> anyhow::Result<()> {
        let path = self.document_path(key)?;
        write_json_atomic(&path, document)
            .await
            .with_context(|| format!("write document {key}"))
    }
}

pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(Some(value))
}

pub(crate) async fn write_json_atomic<T: serde::Serialize>(
    path: &Path,
    value: &T,
) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    // Unique tmp name: content and metadata saves can land in the same dir concurrently.
    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}
