use serde::{Deserialize, Serialize};
use std::fmt;

use super::chapter::ChapterId;

/// Newtype wrapper for story IDs.
///
/// Story IDs are caller-supplied opaque strings ("1", "2", …) and are the
/// scope within which every chapter and choice ID must be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A story record: metadata plus the entry point into its chapter graph.
///
/// A story owns its entire chapter/choice graph; no chapter or choice is
/// shared across stories, and deleting a story cascades to everything
/// reachable from `root_chapter_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub story_id: StoryId,
    pub title: String,
    pub description: String,
    /// JLPT proficiency label (N5..N1).
    pub level_jlpt: String,
    /// CEFR proficiency label (A1..C2).
    pub level_cefr: String,
    /// Estimated reading time in minutes. Always positive.
    pub estimated_time: u32,
    pub root_chapter_id: ChapterId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_creation() {
        let story = Story {
            story_id: StoryId::new("1"),
            title: "東京での新しい生活".to_string(),
            description: "初めて東京に来た留学生の1日を追体験。".to_string(),
            level_jlpt: "N3".to_string(),
            level_cefr: "B1".to_string(),
            estimated_time: 10,
            root_chapter_id: ChapterId::new("ch-1-1"),
        };
        assert_eq!(story.story_id.as_str(), "1");
        assert_eq!(story.level_jlpt, "N3");
        assert_eq!(story.root_chapter_id, ChapterId::new("ch-1-1"));
    }

    #[test]
    fn story_id_display() {
        assert_eq!(StoryId::new("42").to_string(), "42");
    }
}
