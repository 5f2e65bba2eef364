//! Typed errors for the seams callers branch on.
//!
//! Plumbing (filesystem, HTTP transport, JSON) stays on `anyhow` with context
//! strings; these enums exist where the console shows a different message per
//! failure kind.

use thiserror::Error;

use crate::sections::SectionId;

/// Failures reported by an identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for {0}")]
    EmailExists(String),

    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Identity provider rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures reported by the asset uploader.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Missing asset host cloud name or upload preset")]
    MissingConfig,

    #[error("Asset host returned {status}: {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Asset host response has no secure_url")]
    MissingUrl,

    #[error("Upload request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failures reported by a content editor.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid edit for {section}: {message}")]
    InvalidAction { section: SectionId, message: String },

    #[error("{section} has no item at index {index}")]
    IndexOutOfRange { section: SectionId, index: usize },

    #[error("{section} has no image field")]
    NoImageField { section: SectionId },

    #[error("{section} has no section metadata")]
    NoMetadata { section: SectionId },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Category already exists: {0}")]
    CategoryExists(String),

    #[error("Save failed: {0:#}")]
    Save(anyhow::Error),

    #[error(transparent)]
    Upload(#[from] UploadError),
}
