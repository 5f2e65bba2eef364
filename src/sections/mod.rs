//! The editable areas of the portfolio site and their document shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::store::DocKey;

pub mod about;
pub mod contact;
pub mod experience;
pub mod hero;
pub mod projects;
pub mod skills;
pub mod social;
pub mod testimonials;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Hero,
    About,
    Skills,
    Experience,
    Projects,
    Testimonials,
    Social,
    Contact,
}

impl SectionId {
    pub const ALL: [SectionId; 8] = [
        SectionId::Hero,
        SectionId::About,
        SectionId::Skills,
        SectionId::Experience,
        SectionId::Projects,
        SectionId::Testimonials,
        SectionId::Social,
        SectionId::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Hero => "hero",
            SectionId::About => "about",
            SectionId::Skills => "skills",
            SectionId::Experience => "experience",
            SectionId::Projects => "projects",
            SectionId::Testimonials => "testimonials",
            SectionId::Social => "social",
            SectionId::Contact => "contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SectionId::Hero => "Hero",
            SectionId::About => "About",
            SectionId::Skills => "Skills",
            SectionId::Experience => "Experience",
            SectionId::Projects => "Projects",
            SectionId::Testimonials => "Testimonials",
            SectionId::Social => "Social Links",
            SectionId::Contact => "Contact",
        }
    }

    /// Contact keeps its copy in the `sections` namespace; it doubles as its
    /// own visibility record.
    pub fn content_key(self) -> DocKey {
        match self {
            SectionId::Contact => DocKey::sections(self.as_str()),
            _ => DocKey::content(self.as_str()),
        }
    }

    pub fn meta_key(self) -> Option<DocKey> {
        self.default_meta().map(|_| DocKey::sections(self.as_str()))
    }

    pub fn default_meta(self) -> Option<SectionMeta> {
        let order = match self {
            SectionId::Hero => 0,
            SectionId::About => 1,
            SectionId::Skills => 2,
            SectionId::Experience => 3,
            SectionId::Projects => 4,
            SectionId::Testimonials => 5,
            SectionId::Social | SectionId::Contact => return None,
        };
        Some(SectionMeta {
            order,
            enabled: true,
        })
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown section: {s}"))
    }
}

/// Display order and visibility of a section on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMeta {
    pub order: u32,
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
struct StoredMeta {
    order: Option<u32>,
    enabled: Option<bool>,
}

impl SectionMeta {
    /// Overlays the well-typed fields of a stored metadata document. Older
    /// documents nest the record under the section's name.
    pub fn merged_with(self, section: SectionId, stored: serde_json::Value) -> anyhow::Result<Self> {
        let stored = match stored {
            serde_json::Value::Object(mut map)
                if !map.contains_key("order") && !map.contains_key("enabled") =>
            {
                map.remove(section.as_str())
                    .unwrap_or(serde_json::Value::Object(map))
            }
            flat => flat,
        };
        let stored: StoredMeta = serde_json::from_value(stored)?;
        Ok(Self {
            order: stored.order.unwrap_or(self.order),
            enabled: stored.enabled.unwrap_or(self.enabled),
        })
    }
}

pub(crate) fn item_mut<T>(
    items: &mut [T],
    index: usize,
    section: SectionId,
) -> Result<&mut T, EditorError> {
    items
        .get_mut(index)
        .ok_or(EditorError::IndexOutOfRange { section, index })
}

pub(crate) fn remove_at<T>(
    items: &mut Vec<T>,
    index: usize,
    section: SectionId,
) -> Result<T, EditorError> {
    if index >= items.len() {
        return Err(EditorError::IndexOutOfRange { section, index });
    }
    Ok(items.remove(index))
}

/// Keeps at most `max` characters, like an input's `maxLength`.
pub(crate) fn truncate_chars(value: String, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_index, _)) => value[..byte_index].to_owned(),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn section_ids_round_trip_through_names() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>().unwrap(), id);
        }
        assert!("footer".parse::<SectionId>().is_err());
    }

    #[test]
    fn document_keys() {
        assert_eq!(SectionId::Hero.content_key().to_string(), "content/hero");
        assert_eq!(
            SectionId::Hero.meta_key().map(|k| k.to_string()),
            Some("sections/hero".to_owned())
        );
        assert_eq!(SectionId::Contact.content_key().to_string(), "sections/contact");
        assert_eq!(SectionId::Contact.meta_key(), None);
        assert_eq!(SectionId::Social.meta_key(), None);
    }

    #[test]
    fn stored_meta_overlays_only_typed_fields() {
        let base = SectionId::Experience.default_meta().unwrap();
        let merged = base
            .merged_with(SectionId::Experience, json!({"enabled": false}))
            .unwrap();
        assert_eq!(
            merged,
            SectionMeta {
                order: 3,
                enabled: false
            }
        );
        assert!(
            base.merged_with(SectionId::Experience, json!({"order": "three"}))
                .is_err()
        );
    }

    #[test]
    fn nested_meta_is_read_from_section_key() {
        let base = SectionId::About.default_meta().unwrap();
        let merged = base
            .merged_with(
                SectionId::About,
                json!({"about": {"order": 6, "enabled": false}, "hero": {"order": 0}}),
            )
            .unwrap();
        assert_eq!(
            merged,
            SectionMeta {
                order: 6,
                enabled: false
            }
        );
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("héllo".to_owned(), 2), "hé");
        assert_eq!(truncate_chars("abc".to_owned(), 5), "abc");
    }
}
