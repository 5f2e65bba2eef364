use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::token::{self, IdTokenSource};
use super::{Identity, IdentityProvider, MIN_PASSWORD_LEN, normalize_email};
use crate::error::IdentityError;

pub const DEFAULT_AUTH_BASE: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, Clone)]
pub struct FirebaseAuthConfig {
    pub api_key: String,
    pub base_url: String,
    /// Secure Token API base, for refreshing ID tokens.
    pub token_base_url: String,
}


/// Firebase Authentication via the Identity Toolkit REST API.
#[derive(Debug, Clone)]
pub struct FirebaseIdentityProvider {
    client: reqwest::Client,
    config: FirebaseAuthConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

impl FirebaseIdentityProvider {
    pub fn new(client: reqwest::Client, config: FirebaseAuthConfig) -> Self {
        Self { client, config }
    }

    pub fn endpoint(&self, method: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .with_context(|| format!("parse auth base url: {}", self.config.base_url))?;
        let segment = format!("accounts:{method}");
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("auth base url cannot be a base"))?
            .pop_if_empty()
            .extend(["v1", segment.as_str()]);
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    pub fn token_endpoint(&self) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.config.token_base_url).with_context(|| {
            format!("parse secure token base url: {}", self.config.token_base_url)
        })?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("secure token base url cannot be a base"))?
            .pop_if_empty()
            .extend(["v1", "token"]);
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    async fn call(&self, method: &str, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let url = self.endpoint(method)?;
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST accounts:{method}"))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .context("read identity provider response body")?;
        if !status.is_success() {
            let code = parse_error_message(&raw).unwrap_or_else(|| format!("HTTP {status}"));
            tracing::warn!(method, %status, %code, "identity provider rejected request");
            return Err(map_error_code(&code, email));
        }

        let parsed: AuthResponse =
            serde_json::from_str(&raw).context("parse identity provider response")?;
        if parsed.refresh_token.is_none() {
            tracing::warn!(method, "no refresh token issued; session ends when the id token expires");
        }
        let credentials = IdTokenSource::new(
            self.client.clone(),
            self.token_endpoint()?,
            parsed.id_token,
            parsed.refresh_token,
            token::lifetime(parsed.expires_in.as_deref()),
        );
        Ok(Identity {
            uid: parsed.local_id,
            email: parsed.email,
            credentials: Some(credentials),
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let identity = self
            .call("signInWithPassword", &normalize_email(email), password)
            .await?;
        tracing::info!(uid = %identity.uid, "signed in");
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let identity = self.call("signUp", &normalize_email(email), password).await?;
        tracing::info!(uid = %identity.uid, "account created");
        Ok(identity)
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), IdentityError> {
        // ID tokens are bearer tokens; signing out means forgetting them.
        tracing::info!(uid = %identity.uid, "signed out");
        Ok(())
    }
}

pub(crate) fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?.to_owned();
    Some(message)
}

fn map_error_code(code: &str, email: &str) -> IdentityError {
    // Codes look like `EMAIL_EXISTS` or `WEAK_PASSWORD : Password should be ...`.
    let head = code.split(':').next().unwrap_or(code).trim();
    match head {
        "EMAIL_NOT_FOUND"
        | "INVALID_PASSWORD"
        | "INVALID_LOGIN_CREDENTIALS"
        | "USER_DISABLED"
        | "MISSING_PASSWORD" => IdentityError::InvalidCredentials,
        "EMAIL_EXISTS" => IdentityError::EmailExists(email.to_owned()),
        "WEAK_PASSWORD" => IdentityError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        },
        "INVALID_EMAIL" | "MISSING_EMAIL" => IdentityError::InvalidEmail(email.to_owned()),
        _ => IdentityError::Rejected(code.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_carries_method_and_key() {
        let provider = FirebaseIdentityProvider::new(
            reqwest::Client::new(),
            FirebaseAuthConfig {
                api_key: "abc".to_owned(),
                base_url: "http://127.0.0.1:9/".to_owned(),
                token_base_url: "http://127.0.0.1:9/secure".to_owned(),
            },
        );
        let url = provider.endpoint("signUp").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/v1/accounts:signUp?key=abc");
        let url = provider.token_endpoint().unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/secure/v1/token?key=abc");
    }

    #[test]
    fn error_codes_map_to_identity_errors() {
        assert!(matches!(
            map_error_code("INVALID_LOGIN_CREDENTIALS", "a@b.co"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            map_error_code("EMAIL_EXISTS", "a@b.co"),
            IdentityError::EmailExists(email) if email == "a@b.co"
        ));
        assert!(matches!(
            map_error_code("WEAK_PASSWORD : Password should be at least 6 characters", "a@b.co"),
            IdentityError::WeakPassword { min: 6 }
        ));
        assert!(matches!(
            map_error_code("TOO_MANY_ATTEMPTS_TRY_LATER", "a@b.co"),
            IdentityError::Rejected(_)
        ));
    }
}
