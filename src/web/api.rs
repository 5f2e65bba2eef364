//! JSON editing API. Every route except `/api/session` needs a signed-in
//! console.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::Value;

use crate::editor::EditorView;
use crate::error::EditorError;
use crate::sections::SectionId;
use crate::session::SessionState;
use crate::shell;
use crate::upload::ImageFile;

use super::AppState;
use super::console::{Console, SharedEditor};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    view: Option<EditorView>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            view: None,
        }
    }

    fn with_view(mut self, view: EditorView) -> Self {
        self.view = Some(view);
        self
    }

    fn from_editor(err: &EditorError) -> Self {
        let status = match err {
            EditorError::Save(_) | EditorError::Upload(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<EditorView>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            view: self.view,
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn signed_in(state: &AppState, jar: &CookieJar) -> Result<Arc<Console>, ApiError> {
    state
        .console(jar)
        .filter(|console| console.session.current().is_authenticated())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "sign in required"))
}

fn parse_section(raw: &str) -> Result<SectionId, ApiError> {
    raw.parse()
        .map_err(|err: anyhow::Error| ApiError::new(StatusCode::NOT_FOUND, err.to_string()))
}

/// Signed-in console plus the requested section's editor, mounted.
async fn open_editor(
    state: &AppState,
    jar: &CookieJar,
    section: &str,
) -> Result<SharedEditor, ApiError> {
    let console = signed_in(state, jar)?;
    let section = parse_section(section)?;
    let editor = console.editor(section, state.backend());
    editor.lock().await.mount().await;
    Ok(editor)
}

pub async fn session(State(state): State<AppState>, jar: CookieJar) -> Json<SessionState> {
    let current = state
        .console(&jar)
        .map(|console| console.session.current())
        .unwrap_or_else(SessionState::signed_out);
    Json(current)
}

#[derive(Serialize)]
pub struct SectionEntry {
    section: SectionId,
    label: &'static str,
    path: String,
}

pub async fn list_sections(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<Vec<SectionEntry>> {
    signed_in(&state, &jar)?;
    let entries = shell::menu()
        .into_iter()
        .filter_map(|item| {
            item.section.map(|section| SectionEntry {
                section,
                label: item.label,
                path: item.path,
            })
        })
        .collect();
    Ok(Json(entries))
}

pub async fn show(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(section): Path<String>,
) -> ApiResult<EditorView> {
    let editor = open_editor(&state, &jar, &section).await?;
    let view = editor.lock().await.view();
    Ok(Json(view))
}

pub async fn edit(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(section): Path<String>,
    Json(action): Json<Value>,
) -> ApiResult<EditorView> {
    let editor = open_editor(&state, &jar, &section).await?;
    let mut editor = editor.lock().await;
    editor
        .edit(action)
        .map_err(|err| ApiError::from_editor(&err).with_view(editor.view()))?;
    Ok(Json(editor.view()))
}

pub async fn reload(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(section): Path<String>,
) -> ApiResult<EditorView> {
    let editor = open_editor(&state, &jar, &section).await?;
    let mut editor = editor.lock().await;
    editor.reload().await;
    Ok(Json(editor.view()))
}

pub async fn save(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(section): Path<String>,
) -> ApiResult<EditorView> {
    let editor = open_editor(&state, &jar, &section).await?;
    let mut editor = editor.lock().await;
    match editor.save().await {
        Ok(()) => Ok(Json(editor.view())),
        Err(err) => Err(ApiError::from_editor(&err).with_view(editor.view())),
    }
}

#[derive(Serialize)]
pub struct UploadResponse {
    url: String,
    view: EditorView,
}

/// Multipart fields: `file` (required) and `index` (list sections only).
pub async fn upload(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(section): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let editor = open_editor(&state, &jar, &section).await?;

    let mut image = None;
    let mut index = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.body_text()))?;
                image = Some(ImageFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "index" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|err| ApiError::new(StatusCode::BAD_REQUEST, err.body_text()))?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let parsed = raw.parse::<usize>().map_err(|_| {
                        ApiError::new(StatusCode::BAD_REQUEST, format!("invalid index: {raw}"))
                    })?;
                    index = Some(parsed);
                }
            }
            _ => {}
        }
    }
    let image = image.ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "file is required"))?;

    let mut editor = editor.lock().await;
    match editor.upload_image(state.uploader(), image, index).await {
        Ok(url) => Ok(Json(UploadResponse {
            url,
            view: editor.view(),
        })),
        Err(err) => Err(ApiError::from_editor(&err).with_view(editor.view())),
    }
}
