use std::path::Path;
use std::sync::Arc;

use crate::config::FirebaseConfig;
use crate::identity::{FirebaseIdentityProvider, Identity, IdentityProvider, LocalIdentityProvider};
use crate::store::{DocumentStore, FirestoreDocumentStore, LocalFsDocumentStore};

/// Identity provider plus the document store handed to each signed-in user.
#[derive(Clone)]
pub struct Backend {
    identity: Arc<dyn IdentityProvider>,
    documents: DocumentSource,
}

#[derive(Clone)]
enum DocumentSource {
    Shared(Arc<dyn DocumentStore>),
    Firestore(FirestoreDocumentStore),
}

impl Backend {
    pub fn new(identity: Arc<dyn IdentityProvider>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            identity,
            documents: DocumentSource::Shared(documents),
        }
    }

    pub fn local(data_dir: &Path) -> Self {
        Self::new(
            Arc::new(LocalIdentityProvider::new(data_dir)),
            Arc::new(LocalFsDocumentStore::new(data_dir)),
        )
    }

    pub fn firebase(client: reqwest::Client, config: &FirebaseConfig) -> Self {
        Self {
            identity: Arc::new(FirebaseIdentityProvider::new(client.clone(), config.auth())),
            documents: DocumentSource::Firestore(FirestoreDocumentStore::new(
                client,
                config.firestore(),
            )),
        }
    }

    /// Firebase when its API key and project id are configured, else local files.
    pub fn from_env(client: reqwest::Client, data_dir: &Path) -> Self {
        match FirebaseConfig::from_env() {
            Some(config) => {
                tracing::info!(project_id = %config.project_id, "using firebase backend");
                Self::firebase(client, &config)
            }
            None => {
                tracing::info!(data_dir = %data_dir.display(), "using local backend");
                Self::local(data_dir)
            }
        }
    }

    pub fn identity(&self) -> Arc<dyn IdentityProvider> {
        Arc::clone(&self.identity)
    }

    pub fn documents_for(&self, identity: Option<&Identity>) -> Arc<dyn DocumentStore> {
        match &self.documents {
            DocumentSource::Shared(store) => Arc::clone(store),
            DocumentSource::Firestore(store) => {
                let credentials = identity.and_then(|i| i.credentials.clone());
                match credentials {
                    Some(credentials) => Arc::new(store.clone().with_credentials(credentials)),
                    None => Arc::new(store.clone()),
                }
            }
        }
    }
}
