use serde::{Deserialize, Serialize};

use super::{SectionId, item_mut, remove_at, truncate_chars};
use crate::editor::Section;
use crate::error::EditorError;

pub struct Projects;

pub const SHORT_DESCRIPTION_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub image_url: String,
    pub live_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsDraft {
    pub list: Vec<Project>,
}

impl Default for ProjectsDraft {
    fn default() -> Self {
        Self {
            list: vec![Project::default()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectField {
    Title,
    ShortDescription,
    Description,
    ImageUrl,
    LiveUrl,
}

impl ProjectsDraft {
    pub fn add(&mut self) {
        self.list.push(Project::default());
    }

    /// Removes from the draft only; the store changes on the next save.
    pub fn remove(&mut self, index: usize) -> Result<Project, EditorError> {
        remove_at(&mut self.list, index, SectionId::Projects)
    }

    pub fn set(&mut self, index: usize, field: ProjectField, value: String) -> Result<(), EditorError> {
        let project = item_mut(&mut self.list, index, SectionId::Projects)?;
        match field {
            ProjectField::Title => project.title = value,
            ProjectField::ShortDescription => {
                project.short_description = truncate_chars(value, SHORT_DESCRIPTION_MAX_CHARS);
            }
            ProjectField::Description => {
                project.description = truncate_chars(value, DESCRIPTION_MAX_CHARS);
            }
            ProjectField::ImageUrl => project.image_url = value,
            ProjectField::LiveUrl => project.live_url = value,
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProjectsAction {
    Add,
    Remove { index: usize },
    Set {
        index: usize,
        field: ProjectField,
        value: String,
    },
}

impl Section for Projects {
    const ID: SectionId = SectionId::Projects;

    type Draft = ProjectsDraft;
    type Action = ProjectsAction;

    fn apply(draft: &mut ProjectsDraft, action: ProjectsAction) -> Result<(), EditorError> {
        match action {
            ProjectsAction::Add => draft.add(),
            ProjectsAction::Remove { index } => {
                draft.remove(index)?;
            }
            ProjectsAction::Set {
                index,
                field,
                value,
            } => draft.set(index, field, value)?,
        }
        Ok(())
    }

    fn set_image_url(
        draft: &mut ProjectsDraft,
        index: Option<usize>,
        url: String,
    ) -> Result<(), EditorError> {
        let index = index.ok_or_else(|| EditorError::InvalidAction {
            section: SectionId::Projects,
            message: "image upload needs a project index".to_owned(),
        })?;
        draft.set(index, ProjectField::ImageUrl, url)
    }
}
