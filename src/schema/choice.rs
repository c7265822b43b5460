use serde::{Deserialize, Serialize};
use std::fmt;

use super::chapter::ChapterId;

/// Newtype wrapper for choice IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceId(pub String);

impl ChoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed edge of a story graph: one option presented to the reader
/// at `chapter_id`, advancing to `next_chapter_id`.
///
/// `display_order` is 1-based and gapless among the choices sharing a
/// source chapter; it defines presentation order, not graph topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub choice_id: ChoiceId,
    pub chapter_id: ChapterId,
    pub choice_text: String,
    pub choice_description: String,
    pub next_chapter_id: ChapterId,
    pub display_order: u32,
}
