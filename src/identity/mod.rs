//! Email/password identity providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

mod firebase;
mod local;
mod token;

pub use firebase::{DEFAULT_AUTH_BASE, FirebaseAuthConfig, FirebaseIdentityProvider};
pub use local::LocalIdentityProvider;
pub use token::{DEFAULT_SECURE_TOKEN_BASE, IdTokenSource};

pub const MIN_PASSWORD_LEN: usize = 6;

/// A signed-in user.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    /// Bearer credentials for providers that issue them; never serialized out.
    #[serde(skip)]
    pub credentials: Option<IdTokenSource>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("credentials", &self.credentials.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;
    async fn sign_out(&self, identity: &Identity) -> Result<(), IdentityError>;
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), IdentityError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        })
        && !email.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(IdentityError::InvalidEmail(email.to_owned()))
    }
}

pub fn validate_password(password: &str) -> Result<(), IdentityError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(IdentityError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada example@example.com").is_err());
        assert!(validate_email("ada@@example.com").is_err());
    }

    #[test]
    fn password_policy_counts_characters() {
        assert!(matches!(
            validate_password("12345"),
            Err(IdentityError::WeakPassword { min: 6 })
        ));
        assert!(validate_password("éééééé").is_ok());
    }

    #[test]
    fn debug_redacts_token() {
        let identity = Identity {
            uid: "u1".to_owned(),
            email: "ada@example.com".to_owned(),
            credentials: Some(IdTokenSource::new(
                reqwest::Client::new(),
                url::Url::parse("http://127.0.0.1:9/v1/token").unwrap(),
                "secret".to_owned(),
                Some("refresh-secret".to_owned()),
                std::time::Duration::from_secs(3600),
            )),
        };
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
