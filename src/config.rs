//! Environment-driven configuration.
//!
//! Values come from the process environment; `load_dotenv` merges a `.env`
//! file first when one exists. Blank values count as unset.

use crate::identity::{DEFAULT_AUTH_BASE, DEFAULT_SECURE_TOKEN_BASE, FirebaseAuthConfig};
use crate::store::{DEFAULT_FIRESTORE_BASE, FirestoreConfig};

pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env"),
    }
}

pub fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHostConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub api_base: String,
}

impl AssetHostConfig {
    /// `None` unless both the cloud name and the upload preset are set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            cloud_name: env_non_empty("CLOUDINARY_CLOUD_NAME")?,
            upload_preset: env_non_empty("CLOUDINARY_UPLOAD_PRESET")?,
            api_base: env_non_empty("CLOUDINARY_API_BASE")
                .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_owned()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub auth_base: String,
    pub token_base: String,
    pub firestore_base: String,
}

impl FirebaseConfig {
    /// `None` unless both the API key and the project id are set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_key: env_non_empty("FIREBASE_API_KEY")?,
            project_id: env_non_empty("FIREBASE_PROJECT_ID")?,
            auth_base: env_non_empty("FIREBASE_AUTH_BASE")
                .unwrap_or_else(|| DEFAULT_AUTH_BASE.to_owned()),
            token_base: env_non_empty("FIREBASE_TOKEN_BASE")
                .unwrap_or_else(|| DEFAULT_SECURE_TOKEN_BASE.to_owned()),
            firestore_base: env_non_empty("FIRESTORE_BASE")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE.to_owned()),
        })
    }

    pub fn auth(&self) -> FirebaseAuthConfig {
        FirebaseAuthConfig {
            api_key: self.api_key.clone(),
            base_url: self.auth_base.clone(),
            token_base_url: self.token_base.clone(),
        }
    }

    pub fn firestore(&self) -> FirestoreConfig {
        FirestoreConfig {
            project_id: self.project_id.clone(),
            api_key: self.api_key.clone(),
            base_url: self.firestore_base.clone(),
        }
    }
}
