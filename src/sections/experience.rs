use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{SectionId, item_mut, remove_at};
use crate::editor::Section;
use crate::error::EditorError;

pub struct Experience;

/// The editable slots. Stored documents may carry others; they are kept.
pub const EXPERIENCE_SLOTS: [&str; 5] = [
    "Experience1",
    "Experience2",
    "Experience3",
    "Experience4",
    "Experience5",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub title: String,
    pub context: String,
    pub date: String,
    pub points: Vec<String>,
}

impl Default for ExperienceEntry {
    fn default() -> Self {
        Self {
            title: String::new(),
            context: String::new(),
            date: String::new(),
            points: vec![String::new()],
        }
    }
}

impl ExperienceEntry {
    fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
            && self.context.trim().is_empty()
            && self.date.trim().is_empty()
            && self.points.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperienceDraft(pub BTreeMap<String, ExperienceEntry>);

impl Default for ExperienceDraft {
    fn default() -> Self {
        Self(
            EXPERIENCE_SLOTS
                .iter()
                .map(|slot| ((*slot).to_owned(), ExperienceEntry::default()))
                .collect(),
        )
    }
}

impl ExperienceDraft {
    pub fn slot(&self, slot: &str) -> Option<&ExperienceEntry> {
        self.0.get(slot)
    }

    pub fn slot_mut(&mut self, slot: &str) -> Result<&mut ExperienceEntry, EditorError> {
        self.0
            .get_mut(slot)
            .ok_or_else(|| EditorError::InvalidAction {
                section: SectionId::Experience,
                message: format!("unknown experience slot: {slot}"),
            })
    }

    pub fn add_point(&mut self, slot: &str) -> Result<(), EditorError> {
        self.slot_mut(slot)?.points.push(String::new());
        Ok(())
    }

    pub fn set_point(&mut self, slot: &str, index: usize, value: String) -> Result<(), EditorError> {
        let points = &mut self.slot_mut(slot)?.points;
        *item_mut(points, index, SectionId::Experience)? = value;
        Ok(())
    }

    pub fn remove_point(&mut self, slot: &str, index: usize) -> Result<String, EditorError> {
        let points = &mut self.slot_mut(slot)?.points;
        remove_at(points, index, SectionId::Experience)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceField {
    Title,
    Context,
    Date,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ExperienceAction {
    Set {
        slot: String,
        field: ExperienceField,
        value: String,
    },
    AddPoint {
        slot: String,
    },
    SetPoint {
        slot: String,
        index: usize,
        value: String,
    },
    RemovePoint {
        slot: String,
        index: usize,
    },
}

impl Section for Experience {
    const ID: SectionId = SectionId::Experience;

    type Draft = ExperienceDraft;
    type Action = ExperienceAction;

    fn apply(draft: &mut ExperienceDraft, action: ExperienceAction) -> Result<(), EditorError> {
        match action {
            ExperienceAction::Set { slot, field, value } => {
                let entry = draft.slot_mut(&slot)?;
                match field {
                    ExperienceField::Title => entry.title = value,
                    ExperienceField::Context => entry.context = value,
                    ExperienceField::Date => entry.date = value,
                }
                Ok(())
            }
            ExperienceAction::AddPoint { slot } => draft.add_point(&slot),
            ExperienceAction::SetPoint { slot, index, value } => {
                draft.set_point(&slot, index, value)
            }
            ExperienceAction::RemovePoint { slot, index } => {
                draft.remove_point(&slot, index).map(|_| ())
            }
        }
    }

    /// Stored slots are laid over the five default slots.
    fn from_document(document: Value) -> anyhow::Result<ExperienceDraft> {
        let stored: BTreeMap<String, ExperienceEntry> = serde_json::from_value(document)?;
        let mut draft = ExperienceDraft::default();
        draft.0.extend(stored);
        Ok(draft)
    }

    /// Drops blank bullet points, then slots with nothing left in them.
    fn prepare_save(draft: &ExperienceDraft) -> ExperienceDraft {
        ExperienceDraft(
            draft
                .0
                .iter()
                .map(|(slot, entry)| {
                    let points = entry
                        .points
                        .iter()
                        .filter(|p| !p.trim().is_empty())
                        .cloned()
                        .collect();
                    (slot.clone(), ExperienceEntry { points, ..entry.clone() })
                })
                .filter(|(_, entry)| !entry.is_blank())
                .collect(),
        )
    }
}
