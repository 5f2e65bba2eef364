use serde::{Deserialize, Serialize};

use super::{SectionId, item_mut, remove_at};
use crate::editor::Section;
use crate::error::EditorError;

pub struct About;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutDraft {
    pub title: String,
    pub paragraphs: Vec<String>,
    pub image_url: String,
}

impl Default for AboutDraft {
    fn default() -> Self {
        Self {
            title: "About Me".to_owned(),
            paragraphs: vec![String::new()],
            image_url: String::new(),
        }
    }
}

impl AboutDraft {
    pub fn add_paragraph(&mut self) {
        self.paragraphs.push(String::new());
    }

    pub fn set_paragraph(&mut self, index: usize, text: String) -> Result<(), EditorError> {
        *item_mut(&mut self.paragraphs, index, SectionId::About)? = text;
        Ok(())
    }

    pub fn remove_paragraph(&mut self, index: usize) -> Result<String, EditorError> {
        remove_at(&mut self.paragraphs, index, SectionId::About)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AboutAction {
    SetTitle { title: String },
    AddParagraph,
    SetParagraph { index: usize, text: String },
    RemoveParagraph { index: usize },
    SetImageUrl { url: String },
}

impl Section for About {
    const ID: SectionId = SectionId::About;

    type Draft = AboutDraft;
    type Action = AboutAction;

    fn apply(draft: &mut AboutDraft, action: AboutAction) -> Result<(), EditorError> {
        match action {
            AboutAction::SetTitle { title } => draft.title = title,
            AboutAction::AddParagraph => draft.add_paragraph(),
            AboutAction::SetParagraph { index, text } => draft.set_paragraph(index, text)?,
            AboutAction::RemoveParagraph { index } => {
                draft.remove_paragraph(index)?;
            }
            AboutAction::SetImageUrl { url } => draft.image_url = url,
        }
        Ok(())
    }

    fn set_image_url(
        draft: &mut AboutDraft,
        _index: Option<usize>,
        url: String,
    ) -> Result<(), EditorError> {
        draft.image_url = url;
        Ok(())
    }
}
