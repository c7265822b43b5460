use serde::{Deserialize, Serialize};
use std::fmt;

use super::story::StoryId;

/// Newtype wrapper for chapter IDs.
///
/// Chapter IDs are opaque strings, unique across the whole corpus
/// (e.g., "ch-1-2a" — story 1, beat 2, branch a).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterId(pub String);

impl ChapterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One node of a story graph.
///
/// `chapter_number` is the 1-based position in the canonical narrative
/// sequence and is shared across parallel branches at the same beat;
/// `depth_level` is the 0-based distance from the root along the path
/// taken. `parent_chapter_id` is a display pointer for tree rendering —
/// a convergence chapter has several incoming choices but records only
/// its representative branch as parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_id: ChapterId,
    pub story_id: StoryId,
    pub chapter_number: u32,
    pub depth_level: u32,
    pub parent_chapter_id: Option<ChapterId>,
    /// Plain chapter text.
    pub content: String,
    /// Same text with inline `<ruby>…<rt>…</rt></ruby>` reading
    /// annotations; stripping the markup reproduces `content`.
    pub content_with_ruby: String,
    pub translation: String,
}

impl Chapter {
    /// Returns true if this chapter is a story root.
    pub fn is_root(&self) -> bool {
        self.parent_chapter_id.is_none()
    }
}

/// Removes `<ruby>`/`<rt>` annotation markup, yielding the base text.
///
/// Any `<` that does not open ruby markup is kept literally. An unclosed
/// `<rt>` swallows the rest of the input (the reading runs to the end).
pub fn strip_ruby(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("<ruby>") {
            rest = after;
        } else if let Some(after) = tail.strip_prefix("</ruby>") {
            rest = after;
        } else if let Some(after) = tail.strip_prefix("<rt>") {
            match after.find("</rt>") {
                Some(end) => rest = &after[end + "</rt>".len()..],
                None => rest = "",
            }
        } else {
            out.push('<');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
