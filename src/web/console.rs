//! Per-browser console state: a session plus that session's editors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::backend::Backend;
use crate::editor::{SectionEditor, editor_for};
use crate::identity::IdentityProvider;
use crate::sections::SectionId;
use crate::session::SessionStore;

pub type SharedEditor = Arc<tokio::sync::Mutex<Box<dyn SectionEditor>>>;

pub struct Console {
    pub session: SessionStore,
    editors: Mutex<HashMap<SectionId, SharedEditor>>,
}

impl Console {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            // No identity survives a restart, so resolution is immediate.
            session: SessionStore::resolved(provider),
            editors: Mutex::new(HashMap::new()),
        }
    }

    /// The section's editor, created unmounted on first use.
    pub fn editor(&self, section: SectionId, backend: &Backend) -> SharedEditor {
        let mut editors = self.editors.lock().unwrap_or_else(|p| p.into_inner());
        let editor = editors.entry(section).or_insert_with(|| {
            let store = backend.documents_for(self.session.user().as_ref());
            Arc::new(tokio::sync::Mutex::new(editor_for(section, store)))
        });
        Arc::clone(editor)
    }

    /// Forgets every editor (and its unsaved draft).
    pub fn close_editors(&self) {
        self.editors
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }
}

/// Consoles idle this long are dropped, together with their drafts.
pub const IDLE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

struct Entry {
    console: Arc<Console>,
    last_seen: Instant,
}

/// Signed-in consoles keyed by session cookie token.
pub struct Consoles {
    inner: Mutex<HashMap<String, Entry>>,
    idle_ttl: Duration,
}

impl Default for Consoles {
    fn default() -> Self {
        Self::with_idle_ttl(IDLE_TTL)
    }
}

impl Consoles {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Looks up a console and marks it as seen. Idle consoles are gone.
    pub fn get(&self, token: &str) -> Option<Arc<Console>> {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let now = Instant::now();
        let entry = inner.get_mut(token)?;
        if now.duration_since(entry.last_seen) >= self.idle_ttl {
            inner.remove(token);
            tracing::debug!("idle console session dropped");
            return None;
        }
        entry.last_seen = now;
        Some(Arc::clone(&entry.console))
    }

    /// Stores `console` under a new token, pruning idle consoles first.
    pub fn insert(&self, console: Arc<Console>) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let now = Instant::now();
        let before = inner.len();
        inner.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);
        if inner.len() < before {
            tracing::debug!(pruned = before - inner.len(), "idle console sessions dropped");
        }
        inner.insert(
            token.clone(),
            Entry {
                console,
                last_seen: now,
            },
        );
        tracing::debug!(open = inner.len(), "console session created");
        token
    }

    pub fn remove(&self, token: &str) -> Option<Arc<Console>> {
        self.inner
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(token)
            .map(|entry| entry.console)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
