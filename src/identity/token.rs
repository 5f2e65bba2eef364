//! Short-lived Firebase ID tokens, refreshed through the Secure Token API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

pub const DEFAULT_SECURE_TOKEN_BASE: &str = "https://securetoken.googleapis.com";

/// Tokens this close to expiry are refreshed before use.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when a response carries no usable `expiresIn`.
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

/// A user's ID token plus the refresh token that renews it. Clones share
/// the same token state.
#[derive(Clone)]
pub struct IdTokenSource {
    client: reqwest::Client,
    endpoint: Url,
    state: Arc<Mutex<TokenState>>,
}

struct TokenState {
    id_token: String,
    refresh_token: Option<String>,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

/// Parses the `expiresIn` seconds string Firebase returns.
pub(crate) fn lifetime(expires_in: Option<&str>) -> Duration {
    expires_in
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_LIFETIME)
}

impl IdTokenSource {
    /// `endpoint` is the full token URL, API key included.
    pub fn new(
        client: reqwest::Client,
        endpoint: Url,
        id_token: String,
        refresh_token: Option<String>,
        lifetime: Duration,
    ) -> Self {
        Self {
            client,
            endpoint,
            state: Arc::new(Mutex::new(TokenState {
                id_token,
                refresh_token,
                expires_at: Instant::now() + lifetime,
            })),
        }
    }

    /// The current ID token, refreshed first when it is about to expire.
    pub async fn id_token(&self) -> anyhow::Result<String> {
        let mut state = self.state.lock().await;
        if Instant::now() + EXPIRY_MARGIN < state.expires_at {
            return Ok(state.id_token.clone());
        }
        tracing::debug!("id token near expiry; refreshing");
        self.exchange(&mut state).await
    }

    /// Replaces a token the server rejected. Concurrent callers holding the
    /// same rejected token share one exchange.
    pub async fn refresh(&self, rejected: &str) -> anyhow::Result<String> {
        let mut state = self.state.lock().await;
        if state.id_token != rejected {
            return Ok(state.id_token.clone());
        }
        self.exchange(&mut state).await
    }

    async fn exchange(&self, state: &mut TokenState) -> anyhow::Result<String> {
        let refresh_token = state
            .refresh_token
            .clone()
            .ok_or_else(|| anyhow::anyhow!("id token expired and no refresh token is held"))?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await
            .context("POST secure token")?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .context("read secure token response body")?;
        if !status.is_success() {
            let message = super::firebase::parse_error_message(&raw).unwrap_or(raw);
            anyhow::bail!("secure token refresh failed ({status}): {message}");
        }

        let parsed: RefreshResponse =
            serde_json::from_str(&raw).context("parse secure token response")?;
        state.id_token = parsed.id_token;
        if let Some(rotated) = parsed.refresh_token {
            state.refresh_token = Some(rotated);
        }
        state.expires_at = Instant::now() + lifetime(parsed.expires_in.as_deref());
        tracing::info!("id token refreshed");
        Ok(state.id_token.clone())
    }
}

impl PartialEq for IdTokenSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for IdTokenSource {}

impl std::fmt::Debug for IdTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenSource")
            .field("endpoint", &self.endpoint.path())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(lifetime: Duration, refresh_token: Option<&str>) -> IdTokenSource {
        IdTokenSource::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/v1/token?key=k").unwrap(),
            "token-1".to_owned(),
            refresh_token.map(str::to_owned),
            lifetime,
        )
    }

    #[test]
    fn lifetime_parses_seconds_with_fallback() {
        assert_eq!(lifetime(Some("3600")), Duration::from_secs(3600));
        assert_eq!(lifetime(Some(" 30 ")), Duration::from_secs(30));
        assert_eq!(lifetime(Some("soon")), DEFAULT_LIFETIME);
        assert_eq!(lifetime(None), DEFAULT_LIFETIME);
    }

    #[tokio::test]
    async fn fresh_token_is_used_as_is() -> anyhow::Result<()> {
        let source = source(Duration::from_secs(3600), None);
        assert_eq!(source.id_token().await?, "token-1");
        Ok(())
    }

    #[tokio::test]
    async fn expired_token_without_refresh_token_is_an_error() {
        let source = source(Duration::ZERO, None);
        let err = source.id_token().await.unwrap_err();
        assert!(err.to_string().contains("no refresh token"));
    }

    #[tokio::test]
    async fn refresh_of_superseded_token_reuses_current() -> anyhow::Result<()> {
        let source = source(Duration::from_secs(3600), None);
        assert_eq!(source.refresh("token-0").await?, "token-1");
        Ok(())
    }

    #[test]
    fn clones_compare_equal() {
        let a = source(Duration::from_secs(10), None);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, source(Duration::from_secs(10), None));
    }
}
