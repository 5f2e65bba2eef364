use serde::{Deserialize, Serialize};

use super::SectionId;
use crate::editor::Section;
use crate::error::EditorError;

pub struct Contact;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactDraft {
    pub enabled: bool,
    pub display_number: u32,
    pub description: String,
}

impl Default for ContactDraft {
    fn default() -> Self {
        Self {
            enabled: true,
            display_number: 1,
            description: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ContactAction {
    SetEnabled { enabled: bool },
    SetDisplayNumber { display_number: u32 },
    SetDescription { description: String },
}

impl Section for Contact {
    const ID: SectionId = SectionId::Contact;

    type Draft = ContactDraft;
    type Action = ContactAction;

    fn apply(draft: &mut ContactDraft, action: ContactAction) -> Result<(), EditorError> {
        match action {
            ContactAction::SetEnabled { enabled } => draft.enabled = enabled,
            ContactAction::SetDisplayNumber { display_number } => {
                draft.display_number = display_number;
            }
            ContactAction::SetDescription { description } => draft.description = description,
        }
        Ok(())
    }
}
