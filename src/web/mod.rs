//! The console's HTTP surface: login and admin pages plus a JSON editing API.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_http::trace::TraceLayer;

use crate::backend::Backend;
use crate::upload::AssetUploader;

pub mod api;
pub mod auth;
pub mod console;
pub mod pages;

use console::{Console, Consoles};

pub const SESSION_COOKIE: &str = "folio_session";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    backend: Backend,
    uploader: Arc<AssetUploader>,
    consoles: Arc<Consoles>,
}

impl AppState {
    pub fn new(backend: Backend, uploader: AssetUploader) -> Self {
        Self {
            backend,
            uploader: Arc::new(uploader),
            consoles: Arc::new(Consoles::default()),
        }
    }

    /// Replaces the console registry, e.g. to change its idle timeout.
    pub fn with_consoles(mut self, consoles: Consoles) -> Self {
        self.consoles = Arc::new(consoles);
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn uploader(&self) -> &AssetUploader {
        &self.uploader
    }

    /// Number of signed-in consoles held in memory.
    pub fn open_consoles(&self) -> usize {
        self.consoles.len()
    }

    /// The console bound to the request's session cookie, if any.
    pub fn console(&self, jar: &CookieJar) -> Option<Arc<Console>> {
        session_token(jar).and_then(|token| self.consoles.get(token))
    }

    /// A console not yet bound to any cookie.
    pub fn new_console(&self) -> Console {
        Console::new(self.backend.identity())
    }

    /// Registers `console` and returns the cookie that selects it.
    pub fn register(&self, console: Arc<Console>) -> Cookie<'static> {
        session_cookie(self.consoles.insert(console))
    }

    /// Unbinds the request's console from its cookie.
    pub fn unregister(&self, jar: &CookieJar) -> Option<Arc<Console>> {
        session_token(jar).and_then(|token| self.consoles.remove(token))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/login", get(pages::page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/api/session", get(api::session))
        .route("/api/sections", get(api::list_sections))
        .route("/api/sections/:section", get(api::show))
        .route("/api/sections/:section/edit", post(api::edit))
        .route("/api/sections/:section/reload", post(api::reload))
        .route("/api/sections/:section/save", post(api::save))
        .route(
            "/api/sections/:section/upload",
            post(api::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .fallback(pages::page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value_trimmed)
        .filter(|token| !token.is_empty())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Matches [`session_cookie`] so browsers drop it.
pub(crate) fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar(raw: &'static str) -> CookieJar {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            axum::http::HeaderValue::from_static(raw),
        );
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn session_token_is_read_from_cookie_jar() {
        assert_eq!(
            session_token(&jar("theme=dark; folio_session=abc123; other=1")),
            Some("abc123")
        );
        assert_eq!(session_token(&jar("folio_session=\"abc123\"")), Some("abc123"));
        assert_eq!(session_token(&jar("folio_session=")), None);
        assert_eq!(session_token(&CookieJar::new()), None);
    }

    #[test]
    fn session_cookie_is_http_only_and_site_wide() {
        let cookie = session_cookie("abc123".to_owned());
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
