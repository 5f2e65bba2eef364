use axum::extract::State;
use axum::http::Uri;
use axum::response::{Html, IntoResponse as _, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::editor::{EditorView, FlashKind};
use crate::sections::SectionId;
use crate::session::SessionState;
use crate::shell::{self, Navigation, View};

use super::AppState;

/// Every non-API GET lands here and is routed through the session gate.
/// Only a successful login creates a console; without one the visitor is
/// signed out.
pub async fn page(State(state): State<AppState>, jar: CookieJar, uri: Uri) -> Response {
    let console = state.console(&jar);
    let session = console
        .as_ref()
        .map(|console| console.session.current())
        .unwrap_or_else(SessionState::signed_out);

    match shell::navigate(uri.path(), &session) {
        Navigation::Loading => Html(loading_page()).into_response(),
        Navigation::Redirect(to) => Redirect::to(to).into_response(),
        Navigation::Render(View::Login) => Html(login_page(None)).into_response(),
        Navigation::Render(View::Admin(section)) => {
            let Some(console) = console else {
                return Redirect::to(shell::LOGIN_PATH).into_response();
            };
            let email = session.user.map(|user| user.email).unwrap_or_default();
            let body = match section {
                None => dashboard_panel(),
                Some(section) => {
                    let editor = console.editor(section, state.backend());
                    let mut editor = editor.lock().await;
                    editor.mount().await;
                    editor_panel(&editor.view())
                }
            };
            Html(admin_page(&email, section, &body)).into_response()
        }
    }
}

pub fn loading_page() -> String {
    layout("Loading", "<p class=\"loading\">Loading...</p>")
}

pub fn login_page(error: Option<&str>) -> String {
    let error = error
        .map(|msg| format!("<p class=\"error\">{}</p>\n", escape_html(msg)))
        .unwrap_or_default();
    let body = format!(
        r#"<h1>Admin Login</h1>
{error}<form method="post" action="{login}">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit" name="mode" value="signin">Sign in</button>
  <button type="submit" name="mode" value="signup">Create account</button>
</form>
"#,
        login = shell::LOGIN_PATH,
    );
    layout("Admin Login", &body)
}

pub fn admin_page(email: &str, active: Option<SectionId>, body: &str) -> String {
    let menu = shell::menu()
        .into_iter()
        .map(|item| {
            let class = if item.section == active {
                " class=\"active\""
            } else {
                ""
            };
            format!(
                "    <li><a href=\"{}\"{class}>{}</a></li>\n",
                escape_html(&item.path),
                escape_html(item.label)
            )
        })
        .collect::<String>();
    let page = format!(
        r#"<nav>
  <p>Signed in as {email}</p>
  <ul>
{menu}  </ul>
  <form method="post" action="/logout"><button type="submit">Log out</button></form>
</nav>
<main>
{body}</main>
"#,
        email = escape_html(email),
    );
    layout("Admin", &page)
}

fn dashboard_panel() -> String {
    "<h1>Dashboard</h1>\n<p>Pick a section to edit.</p>\n".to_owned()
}

fn editor_panel(view: &EditorView) -> String {
    let mut html = format!("<h1>{}</h1>\n", escape_html(view.label));
    if let Some(message) = &view.message {
        let class = match message.kind {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        };
        html.push_str(&format!(
            "<p class=\"{class}\">{}</p>\n",
            escape_html(&message.text)
        ));
    }
    if let Some(meta) = view.meta {
        html.push_str(&format!(
            "<p>Display order {} &middot; {}</p>\n",
            meta.order,
            if meta.enabled { "shown" } else { "hidden" }
        ));
    }
    let draft = serde_json::to_string_pretty(&view.draft).unwrap_or_default();
    html.push_str(&format!(
        "<pre id=\"draft\" data-section=\"{}\">{}</pre>\n",
        view.section,
        escape_html(&draft)
    ));
    html
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>{title}</title></head>
  <body>
{body}  </body>
</html>
"#,
        title = escape_html(title),
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
