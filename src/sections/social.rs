use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{SectionId, item_mut, remove_at};
use crate::editor::Section;
use crate::error::EditorError;

pub struct SocialLinks;

pub const MAX_SOCIAL_LINKS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialDraft {
    pub links: Vec<SocialLink>,
}

impl Default for SocialDraft {
    fn default() -> Self {
        Self {
            links: vec![SocialLink::default()],
        }
    }
}

/// Older documents stored bare URL strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredLink {
    Url(String),
    Link(SocialLink),
}

#[derive(Deserialize)]
struct StoredSocial {
    #[serde(default)]
    links: Option<Vec<StoredLink>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialField {
    Name,
    Url,
}

impl SocialDraft {
    /// Appends a blank link unless the list is full. Returns whether it did.
    pub fn add(&mut self) -> bool {
        if self.links.len() >= MAX_SOCIAL_LINKS {
            return false;
        }
        self.links.push(SocialLink::default());
        true
    }

    pub fn remove(&mut self, index: usize) -> Result<SocialLink, EditorError> {
        remove_at(&mut self.links, index, SectionId::Social)
    }

    pub fn set(&mut self, index: usize, field: SocialField, value: String) -> Result<(), EditorError> {
        let link = item_mut(&mut self.links, index, SectionId::Social)?;
        match field {
            SocialField::Name => link.name = value,
            SocialField::Url => link.url = value,
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SocialAction {
    Add,
    Remove { index: usize },
    Set {
        index: usize,
        field: SocialField,
        value: String,
    },
}

impl Section for SocialLinks {
    const ID: SectionId = SectionId::Social;

    type Draft = SocialDraft;
    type Action = SocialAction;

    fn apply(draft: &mut SocialDraft, action: SocialAction) -> Result<(), EditorError> {
        match action {
            SocialAction::Add => {
                if !draft.add() {
                    tracing::debug!(max = MAX_SOCIAL_LINKS, "social links full; add ignored");
                }
            }
            SocialAction::Remove { index } => {
                draft.remove(index)?;
            }
            SocialAction::Set {
                index,
                field,
                value,
            } => draft.set(index, field, value)?,
        }
        Ok(())
    }

    fn from_document(document: Value) -> anyhow::Result<SocialDraft> {
        let stored: StoredSocial = serde_json::from_value(document)?;
        let Some(links) = stored.links else {
            return Ok(SocialDraft::default());
        };
        let links = links
            .into_iter()
            .take(MAX_SOCIAL_LINKS)
            .map(|link| match link {
                StoredLink::Url(url) => SocialLink {
                    name: String::new(),
                    url,
                },
                StoredLink::Link(link) => link,
            })
            .collect();
        Ok(SocialDraft { links })
    }

    fn prepare_save(draft: &SocialDraft) -> SocialDraft {
        SocialDraft {
            links: draft
                .links
                .iter()
                .filter(|link| !link.url.trim().is_empty())
                .take(MAX_SOCIAL_LINKS)
                .cloned()
                .collect(),
        }
    }
}
