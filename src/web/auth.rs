use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse as _, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::shell;

use super::pages::login_page;
use super::{AppState, expired_session_cookie};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    #[default]
    Signin,
    Signup,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub mode: LoginMode,
}

/// Signs in (or up) on the request's console, or on a fresh one. A console
/// is registered, under a new cookie, only once sign-in succeeds.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let console = state
        .console(&jar)
        .unwrap_or_else(|| Arc::new(state.new_console()));
    let result = match form.mode {
        LoginMode::Signin => console.session.login(&form.email, &form.password).await,
        LoginMode::Signup => console.session.signup(&form.email, &form.password).await,
    };

    match result {
        Ok(_) => {
            // Editors opened before sign-in would carry the wrong credentials.
            console.close_editors();
            state.unregister(&jar);
            let jar = jar.add(state.register(console));
            (jar, Redirect::to(shell::ADMIN_PATH)).into_response()
        }
        Err(err) => (
            StatusCode::UNAUTHORIZED,
            Html(login_page(Some(&err.to_string()))),
        )
            .into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(console) = state.unregister(&jar) {
        if let Err(err) = console.session.logout().await {
            tracing::warn!(error = %err, "sign-out failed");
        }
        console.close_editors();
    }
    let jar = jar.remove(expired_session_cookie());
    (jar, Redirect::to(shell::LOGIN_PATH)).into_response()
}
