use serde::{Deserialize, Serialize};

use super::SectionId;
use crate::editor::Section;
use crate::error::EditorError;

pub struct Hero;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroDraft {
    pub intro: String,
    pub name: String,
    pub subtitle: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroField {
    Intro,
    Name,
    Subtitle,
    Description,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HeroAction {
    Set { field: HeroField, value: String },
}

impl HeroDraft {
    pub fn set(&mut self, field: HeroField, value: String) {
        let slot = match field {
            HeroField::Intro => &mut self.intro,
            HeroField::Name => &mut self.name,
            HeroField::Subtitle => &mut self.subtitle,
            HeroField::Description => &mut self.description,
        };
        *slot = value;
    }
}

impl Section for Hero {
    const ID: SectionId = SectionId::Hero;

    type Draft = HeroDraft;
    type Action = HeroAction;

    fn apply(draft: &mut HeroDraft, action: HeroAction) -> Result<(), EditorError> {
        match action {
            HeroAction::Set { field, value } => draft.set(field, value),
        }
        Ok(())
    }
}
