//! Document-backed forms.
//!
//! Every section editor has the same lifecycle: fetch the section's document
//! (and metadata) once on mount, mutate an in-memory draft, and write the
//! whole draft back on an explicit save. [`DocumentForm`] implements that
//! once; a [`Section`] supplies the document shape and its edit actions.
//!
//! All mutations, deletes included, only touch the draft. Nothing reaches
//! the store until [`DocumentForm::save`].

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EditorError;
use crate::sections::{SectionId, SectionMeta};
use crate::store::DocumentStore;
use crate::upload::{AssetUploader, ImageFile};

/// How long save/upload messages stay visible.
pub const FLASH_TTL: Duration = Duration::from_secs(3);

pub trait Section: Send + Sync + 'static {
    const ID: SectionId;

    type Draft: Clone + Default + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    type Action: DeserializeOwned + Debug + Send;

    fn apply(draft: &mut Self::Draft, action: Self::Action) -> Result<(), EditorError>;

    /// Draft for a stored document; missing fields come from defaults.
    fn from_document(document: Value) -> anyhow::Result<Self::Draft> {
        Ok(serde_json::from_value(document)?)
    }

    /// Document actually written on save.
    fn prepare_save(draft: &Self::Draft) -> Self::Draft {
        draft.clone()
    }

    fn set_image_url(
        _draft: &mut Self::Draft,
        _index: Option<usize>,
        _url: String,
    ) -> Result<(), EditorError> {
        Err(EditorError::NoImageField { section: Self::ID })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorState {
    Loading,
    Ready,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
    shown_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashView {
    pub kind: FlashKind,
    pub text: String,
}

/// Snapshot of an editor, as served to the console.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorView {
    pub section: SectionId,
    pub label: &'static str,
    pub state: EditorState,
    pub draft: Value,
    pub meta: Option<SectionMeta>,
    pub message: Option<FlashView>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MetaAction {
    SetOrder { order: u32 },
    SetEnabled { enabled: bool },
}

pub struct DocumentForm<S: Section> {
    store: Arc<dyn DocumentStore>,
    state: EditorState,
    draft: S::Draft,
    meta: Option<SectionMeta>,
    flash: Option<Flash>,
    flash_ttl: Duration,
    mounted: bool,
}

impl<S: Section> DocumentForm<S> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            state: EditorState::Loading,
            draft: S::Draft::default(),
            meta: S::ID.default_meta(),
            flash: None,
            flash_ttl: FLASH_TTL,
            mounted: false,
        }
    }

    pub fn with_flash_ttl(mut self, ttl: Duration) -> Self {
        self.flash_ttl = ttl;
        self
    }

    pub fn section(&self) -> SectionId {
        S::ID
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn draft(&self) -> &S::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut S::Draft {
        &mut self.draft
    }

    pub fn meta(&self) -> Option<SectionMeta> {
        self.meta
    }

    /// The current message, until it expires.
    pub fn message(&self) -> Option<&Flash> {
        self.flash
            .as_ref()
            .filter(|flash| flash.shown_at.elapsed() < self.flash_ttl)
    }

    /// Loads the section on first use only.
    pub async fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.reload().await;
    }

    pub async fn reload(&mut self) {
        self.state = EditorState::Loading;
        let section = S::ID;
        let content_key = section.content_key();
        let meta_key = section.meta_key();

        let store = Arc::clone(&self.store);
        let meta_read = async {
            match &meta_key {
                Some(key) => store.get(key).await.map(Some),
                None => Ok(None),
            }
        };
        let (content, meta) = tokio::join!(store.get(&content_key), meta_read);

        match content {
            Ok(Some(document)) => match S::from_document(document) {
                Ok(draft) => {
                    tracing::info!(%section, key = %content_key, "content loaded");
                    self.draft = draft;
                }
                Err(err) => {
                    tracing::warn!(%section, key = %content_key, error = %format!("{err:#}"), "unreadable content document; using defaults");
                    self.draft = S::Draft::default();
                }
            },
            Ok(None) => {
                tracing::warn!(%section, key = %content_key, "content document does not exist; using defaults");
                self.draft = S::Draft::default();
            }
            Err(err) => {
                tracing::error!(%section, key = %content_key, error = %format!("{err:#}"), "failed to fetch content");
            }
        }

        if let Some(default_meta) = section.default_meta() {
            match meta {
                Ok(Some(Some(stored))) => match default_meta.merged_with(section, stored) {
                    Ok(merged) => self.meta = Some(merged),
                    Err(err) => {
                        tracing::warn!(%section, error = %err, "unreadable section metadata; using defaults");
                        self.meta = Some(default_meta);
                    }
                },
                Ok(_) => {
                    tracing::warn!(%section, "section metadata not found; using defaults");
                    self.meta = Some(default_meta);
                }
                Err(err) => {
                    tracing::error!(%section, error = %format!("{err:#}"), "failed to fetch section metadata");
                }
            }
        }

        self.state = EditorState::Ready;
    }

    pub fn apply(&mut self, action: S::Action) -> Result<(), EditorError> {
        tracing::debug!(section = %S::ID, ?action, "edit");
        S::apply(&mut self.draft, action)
    }

    pub fn apply_meta(&mut self, action: MetaAction) -> Result<(), EditorError> {
        let meta = self
            .meta
            .as_mut()
            .ok_or(EditorError::NoMetadata { section: S::ID })?;
        match action {
            MetaAction::SetOrder { order } => meta.order = order,
            MetaAction::SetEnabled { enabled } => meta.enabled = enabled,
        }
        Ok(())
    }

    /// Applies a wire-format action: metadata ops first, then section ops.
    pub fn apply_json(&mut self, action: Value) -> Result<(), EditorError> {
        if self.meta.is_some()
            && let Ok(meta_action) = serde_json::from_value::<MetaAction>(action.clone())
        {
            return self.apply_meta(meta_action);
        }
        let action = serde_json::from_value::<S::Action>(action).map_err(|err| {
            EditorError::InvalidAction {
                section: S::ID,
                message: err.to_string(),
            }
        })?;
        self.apply(action)
    }

    /// Overwrites the content document (and metadata document, if any) with
    /// the draft. Both writes are issued together with no atomicity between
    /// them. The draft is left as typed whatever the outcome.
    pub async fn save(&mut self) -> Result<(), EditorError> {
        self.state = EditorState::Saving;
        let result = self.write().await;
        self.state = EditorState::Ready;

        match result {
            Ok(()) => {
                tracing::info!(section = %S::ID, "saved");
                self.show(FlashKind::Success, "Saved successfully!");
                Ok(())
            }
            Err(err) => {
                tracing::error!(section = %S::ID, error = %format!("{err:#}"), "save failed");
                self.show(FlashKind::Error, "Save failed.");
                Err(EditorError::Save(err))
            }
        }
    }

    async fn write(&self) -> anyhow::Result<()> {
        let section = S::ID;
        let document =
            serde_json::to_value(S::prepare_save(&self.draft)).context("serialize draft")?;
        let content_key = section.content_key();

        let meta_write = async {
            match (section.meta_key(), self.meta) {
                (Some(key), Some(meta)) => {
                    let value = serde_json::to_value(meta).context("serialize section metadata")?;
                    self.store
                        .put(&key, &value)
                        .await
                        .with_context(|| format!("write {key}"))
                }
                _ => Ok(()),
            }
        };
        let (content, meta) = tokio::join!(self.store.put(&content_key, &document), meta_write);
        content.with_context(|| format!("write {content_key}"))?;
        meta?;
        Ok(())
    }

    /// Uploads an image and stores its hosted URL in the section's image
    /// field. On failure the field is left untouched.
    pub async fn upload_image(
        &mut self,
        uploader: &AssetUploader,
        image: ImageFile,
        index: Option<usize>,
    ) -> Result<String, EditorError> {
        // Reject a bad target before creating a remote asset for it.
        S::set_image_url(&mut self.draft.clone(), index, String::new())?;

        match uploader.upload(image).await {
            Ok(url) => {
                S::set_image_url(&mut self.draft, index, url.clone())?;
                self.show(FlashKind::Success, "Image uploaded.");
                Ok(url)
            }
            Err(err) => {
                tracing::error!(section = %S::ID, error = %err, "image upload failed");
                self.show(FlashKind::Error, "Image upload failed.");
                Err(err.into())
            }
        }
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            section: S::ID,
            label: S::ID.label(),
            state: self.state,
            draft: serde_json::to_value(&self.draft).unwrap_or(Value::Null),
            meta: self.meta,
            message: self.message().map(|flash| FlashView {
                kind: flash.kind,
                text: flash.text.clone(),
            }),
        }
    }

    fn show(&mut self, kind: FlashKind, text: &str) {
        self.flash = Some(Flash {
            kind,
            text: text.to_owned(),
            shown_at: Instant::now(),
        });
    }
}

/// Object-safe face of a [`DocumentForm`], for holding editors of different
/// sections side by side.
#[async_trait]
pub trait SectionEditor: Send + Sync {
    fn section(&self) -> SectionId;
    async fn mount(&mut self);
    async fn reload(&mut self);
    fn edit(&mut self, action: Value) -> Result<(), EditorError>;
    async fn save(&mut self) -> Result<(), EditorError>;
    async fn upload_image(
        &mut self,
        uploader: &AssetUploader,
        image: ImageFile,
        index: Option<usize>,
    ) -> Result<String, EditorError>;
    fn view(&self) -> EditorView;
}

#[async_trait]
impl<S: Section> SectionEditor for DocumentForm<S> {
    fn section(&self) -> SectionId {
        S::ID
    }

    async fn mount(&mut self) {
        DocumentForm::mount(self).await;
    }

    async fn reload(&mut self) {
        DocumentForm::reload(self).await;
    }

    fn edit(&mut self, action: Value) -> Result<(), EditorError> {
        self.apply_json(action)
    }

    async fn save(&mut self) -> Result<(), EditorError> {
        DocumentForm::save(self).await
    }

    async fn upload_image(
        &mut self,
        uploader: &AssetUploader,
        image: ImageFile,
        index: Option<usize>,
    ) -> Result<String, EditorError> {
        DocumentForm::upload_image(self, uploader, image, index).await
    }

    fn view(&self) -> EditorView {
        DocumentForm::view(self)
    }
}

pub fn editor_for(section: SectionId, store: Arc<dyn DocumentStore>) -> Box<dyn SectionEditor> {
    use crate::sections::{about, contact, experience, hero, projects, skills, social, testimonials};

    match section {
        SectionId::Hero => Box::new(DocumentForm::<hero::Hero>::new(store)),
        SectionId::About => Box::new(DocumentForm::<about::About>::new(store)),
        SectionId::Skills => Box::new(DocumentForm::<skills::Skills>::new(store)),
        SectionId::Experience => Box::new(DocumentForm::<experience::Experience>::new(store)),
        SectionId::Projects => Box::new(DocumentForm::<projects::Projects>::new(store)),
        SectionId::Testimonials => {
            Box::new(DocumentForm::<testimonials::Testimonials>::new(store))
        }
        SectionId::Social => Box::new(DocumentForm::<social::SocialLinks>::new(store)),
        SectionId::Contact => Box::new(DocumentForm::<contact::Contact>::new(store)),
    }
}
