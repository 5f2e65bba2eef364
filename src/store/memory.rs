use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocKey, DocumentStore};

/// Process-local store. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocKey, Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &DocKey) -> anyhow::Result<Option<Value>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn put(&self, key: &DocKey, document: &Value) -> anyhow::Result<()> {
        key.validate()?;
        self.documents
            .write()
            .await
            .insert(key.clone(), document.clone());
        Ok(())
    }
}
