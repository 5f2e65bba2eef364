//! Observable session state over an [`IdentityProvider`].
//!
//! A `SessionStore` is created per console and passed explicitly to whatever
//! needs it. Subscribers (the navigation shell, API handlers) observe every
//! state change through a `watch` channel.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::IdentityError;
use crate::identity::{Identity, IdentityProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// True only until the initial resolution completes.
    pub loading: bool,
    pub user: Option<Identity>,
}

impl SessionState {
    /// Resolved with nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            loading: false,
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }
}

pub struct SessionStore {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(SessionState {
            loading: true,
            user: None,
        });
        Self { provider, state }
    }

    /// A store whose initial resolution already finished with no user.
    pub fn resolved(provider: Arc<dyn IdentityProvider>) -> Self {
        let store = Self::new(provider);
        store.resolve(None);
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<Identity> {
        self.state.borrow().user.clone()
    }

    /// Completes initial resolution. Later calls are no-ops.
    pub fn resolve(&self, restored: Option<Identity>) {
        self.state.send_if_modified(|state| {
            if !state.loading {
                return false;
            }
            state.loading = false;
            state.user = restored;
            true
        });
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        tracing::debug!("attempting login");
        let identity = self.provider.sign_in(email, password).await.inspect_err(|err| {
            tracing::warn!(error = %err, "login failed");
        })?;
        self.set_user(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        tracing::debug!("attempting signup");
        let identity = self.provider.sign_up(email, password).await.inspect_err(|err| {
            tracing::warn!(error = %err, "signup failed");
        })?;
        self.set_user(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn logout(&self) -> Result<(), IdentityError> {
        if let Some(identity) = self.user() {
            self.provider.sign_out(&identity).await.inspect_err(|err| {
                tracing::warn!(error = %err, "logout failed");
            })?;
        }
        self.set_user(None);
        Ok(())
    }

    fn set_user(&self, user: Option<Identity>) {
        self.state.send_modify(|state| {
            state.loading = false;
            state.user = user;
        });
    }
}
