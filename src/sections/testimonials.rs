use serde::{Deserialize, Serialize};

use super::{SectionId, item_mut, remove_at, truncate_chars};
use crate::editor::Section;
use crate::error::EditorError;

pub struct Testimonials;

pub const QUOTE_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Testimonial {
    pub image_url: String,
    pub quote: String,
    pub project_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialsDraft {
    pub items: Vec<Testimonial>,
}

impl Default for TestimonialsDraft {
    fn default() -> Self {
        Self {
            items: vec![Testimonial::default()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestimonialField {
    ImageUrl,
    Quote,
    ProjectLink,
}

impl TestimonialsDraft {
    pub fn add(&mut self) {
        self.items.push(Testimonial::default());
    }

    pub fn remove(&mut self, index: usize) -> Result<Testimonial, EditorError> {
        remove_at(&mut self.items, index, SectionId::Testimonials)
    }

    pub fn set(
        &mut self,
        index: usize,
        field: TestimonialField,
        value: String,
    ) -> Result<(), EditorError> {
        let item = item_mut(&mut self.items, index, SectionId::Testimonials)?;
        match field {
            TestimonialField::ImageUrl => item.image_url = value,
            TestimonialField::Quote => item.quote = truncate_chars(value, QUOTE_MAX_CHARS),
            TestimonialField::ProjectLink => item.project_link = value,
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TestimonialsAction {
    Add,
    Remove { index: usize },
    Set {
        index: usize,
        field: TestimonialField,
        value: String,
    },
}

impl Section for Testimonials {
    const ID: SectionId = SectionId::Testimonials;

    type Draft = TestimonialsDraft;
    type Action = TestimonialsAction;

    fn apply(draft: &mut TestimonialsDraft, action: TestimonialsAction) -> Result<(), EditorError> {
        match action {
            TestimonialsAction::Add => draft.add(),
            TestimonialsAction::Remove { index } => {
                draft.remove(index)?;
            }
            TestimonialsAction::Set {
                index,
                field,
                value,
            } => draft.set(index, field, value)?,
        }
        Ok(())
    }

    fn set_image_url(
        draft: &mut TestimonialsDraft,
        index: Option<usize>,
        url: String,
    ) -> Result<(), EditorError> {
        let index = index.ok_or_else(|| EditorError::InvalidAction {
            section: SectionId::Testimonials,
            message: "image upload needs a testimonial index".to_owned(),
        })?;
        draft.set(index, TestimonialField::ImageUrl, url)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn quote_is_capped() {
        let mut draft = TestimonialsDraft::default();
        draft.set(0, TestimonialField::Quote, "q".repeat(1001)).unwrap();
        assert_eq!(draft.items[0].quote.chars().count(), QUOTE_MAX_CHARS);
    }

    #[test]
    fn stored_items_load_in_order() {
        let draft = Testimonials::from_document(json!({
            "items": [
                {"quote": "Great", "projectLink": "https://a"},
                {"quote": "Fast", "imageUrl": "https://img/b.png"},
            ]
        }))
        .unwrap();
        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].project_link, "https://a");
        assert_eq!(draft.items[1].image_url, "https://img/b.png");
    }
}
