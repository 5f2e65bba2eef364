//! Whole-document persistence addressed by `namespace/name` keys.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

mod firestore;
pub(crate) mod local_fs;
mod memory;

pub use firestore::{DEFAULT_FIRESTORE_BASE, FirestoreConfig, FirestoreDocumentStore};
pub use local_fs::LocalFsDocumentStore;
pub use memory::MemoryDocumentStore;

pub const CONTENT_NAMESPACE: &str = "content";
pub const SECTIONS_NAMESPACE: &str = "sections";

/// Two-level document address, e.g. `content/hero`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocKey {
    pub namespace: String,
    pub name: String,
}

impl DocKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn content(name: &str) -> Self {
        Self::new(CONTENT_NAMESPACE, name)
    }

    pub fn sections(name: &str) -> Self {
        Self::new(SECTIONS_NAMESPACE, name)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let (namespace, name) = raw
            .split_once('/')
            .ok_or_else(|| anyhow::anyhow!("document key must be `namespace/name`: {raw}"))?;
        let key = Self::new(namespace, name);
        key.validate()?;
        Ok(key)
    }

    /// Rejects segments that would escape a directory or nest a path.
    pub fn validate(&self) -> anyhow::Result<()> {
        for segment in [&self.namespace, &self.name] {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains(['/', '\\'])
            {
                anyhow::bail!("invalid document key segment: {segment:?}");
            }
        }
        Ok(())
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Whole-document get/put. `put` overwrites (upsert, no merge, no version
/// check); `get` returns `None` for absent documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, key: &DocKey) -> anyhow::Result<Option<Value>>;
    async fn put(&self, key: &DocKey, document: &Value) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_namespace_and_name() {
        let key = DocKey::parse("content/hero").unwrap();
        assert_eq!(key, DocKey::content("hero"));
        assert_eq!(key.to_string(), "content/hero");
    }

    #[test]
    fn parse_rejects_traversal_and_nesting() {
        assert!(DocKey::parse("content").is_err());
        assert!(DocKey::parse("../hero").is_err());
        assert!(DocKey::parse("content/a/b").is_err());
        assert!(DocKey::parse("content/").is_err());
    }
}
