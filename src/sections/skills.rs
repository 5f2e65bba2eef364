use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{SectionId, item_mut, remove_at};
use crate::editor::Section;
use crate::error::EditorError;

pub struct Skills;

pub const DEFAULT_CATEGORIES: [&str; 3] = ["Frontend", "Backend", "Tools"];

/// Category name to ordered skill labels. Categories are free-form and keep
/// the order they were stored or added in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillsDraft(pub IndexMap<String, Vec<String>>);

impl Default for SkillsDraft {
    fn default() -> Self {
        Self(
            DEFAULT_CATEGORIES
                .iter()
                .map(|name| ((*name).to_owned(), Vec::new()))
                .collect(),
        )
    }
}

impl SkillsDraft {
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn skills(&self, category: &str) -> Option<&[String]> {
        self.0.get(category).map(Vec::as_slice)
    }

    fn category_mut(&mut self, category: &str) -> Result<&mut Vec<String>, EditorError> {
        self.0
            .get_mut(category)
            .ok_or_else(|| EditorError::UnknownCategory(category.to_owned()))
    }

    pub fn add_category(&mut self, name: &str) -> Result<(), EditorError> {
        let name = valid_name(name)?;
        if self.0.contains_key(&name) {
            return Err(EditorError::CategoryExists(name));
        }
        self.0.insert(name, Vec::new());
        Ok(())
    }

    pub fn rename_category(&mut self, from: &str, to: &str) -> Result<(), EditorError> {
        let to = valid_name(to)?;
        if from == to {
            return Ok(());
        }
        if self.0.contains_key(&to) {
            return Err(EditorError::CategoryExists(to));
        }
        let index = self
            .0
            .get_index_of(from)
            .ok_or_else(|| EditorError::UnknownCategory(from.to_owned()))?;
        if let Some(skills) = self.0.shift_remove(from) {
            self.0.shift_insert(index, to, skills);
        }
        Ok(())
    }

    pub fn remove_category(&mut self, name: &str) -> Result<(), EditorError> {
        self.0
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| EditorError::UnknownCategory(name.to_owned()))
    }

    pub fn add_skill(&mut self, category: &str) -> Result<(), EditorError> {
        self.category_mut(category)?.push(String::new());
        Ok(())
    }

    pub fn set_skill(&mut self, category: &str, index: usize, value: String) -> Result<(), EditorError> {
        *item_mut(self.category_mut(category)?, index, SectionId::Skills)? = value;
        Ok(())
    }

    pub fn remove_skill(&mut self, category: &str, index: usize) -> Result<String, EditorError> {
        remove_at(self.category_mut(category)?, index, SectionId::Skills)
    }
}

fn valid_name(name: &str) -> Result<String, EditorError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EditorError::InvalidAction {
            section: SectionId::Skills,
            message: "category name must not be empty".to_owned(),
        });
    }
    Ok(name.to_owned())
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SkillsAction {
    AddCategory { name: String },
    RenameCategory { from: String, to: String },
    RemoveCategory { name: String },
    AddSkill { category: String },
    SetSkill { category: String, index: usize, value: String },
    RemoveSkill { category: String, index: usize },
}

impl Section for Skills {
    const ID: SectionId = SectionId::Skills;

    type Draft = SkillsDraft;
    type Action = SkillsAction;

    fn apply(draft: &mut SkillsDraft, action: SkillsAction) -> Result<(), EditorError> {
        match action {
            SkillsAction::AddCategory { name } => draft.add_category(&name),
            SkillsAction::RenameCategory { from, to } => draft.rename_category(&from, &to),
            SkillsAction::RemoveCategory { name } => draft.remove_category(&name),
            SkillsAction::AddSkill { category } => draft.add_skill(&category),
            SkillsAction::SetSkill {
                category,
                index,
                value,
            } => draft.set_skill(&category, index, value),
            SkillsAction::RemoveSkill { category, index } => {
                draft.remove_skill(&category, index).map(|_| ())
            }
        }
    }
}
