use serde::{Deserialize, Serialize};

use super::story::StoryId;

/// Authored text for one chapter: the plain version, the ruby-annotated
/// version, and the learner-language translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterText {
    pub content: String,
    pub content_with_ruby: String,
    pub translation: String,
}

impl ChapterText {
    pub fn new(
        content: impl Into<String>,
        content_with_ruby: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            content_with_ruby: content_with_ruby.into(),
            translation: translation.into(),
        }
    }

    /// Name of the first empty text field, if any.
    pub fn empty_field(&self) -> Option<&'static str> {
        if self.content.is_empty() {
            Some("content")
        } else if self.content_with_ruby.is_empty() {
            Some("content_with_ruby")
        } else if self.translation.is_empty() {
            Some("translation")
        } else {
            None
        }
    }
}

/// One authored branch: the choice that opens it at the root, and the
/// simple path of chapters the reader traverses before convergence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSpec {
    pub choice_text: String,
    pub choice_description: String,
    pub path: Vec<ChapterText>,
}

/// The branching structure a story spec declares up front: how many
/// branches fan out at the root, and how many chapters each branch
/// traverses before the shared convergence chapter.
///
/// Path length is uniform across branches — chapter numbers are shared
/// per narrative beat, so ragged branches cannot form a canonical
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphShape {
    pub branch_count: usize,
    pub path_length: usize,
}

/// Text for the single forward choice on non-decision chapters.
///
/// Mid-path chapters and the convergence chapter each offer exactly one
/// choice; its wording is not story-specific in the authored corpus, so
/// it lives here with the corpus defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvanceLabels {
    pub choice_text: String,
    pub continue_description: String,
    pub finale_description: String,
}

impl Default for AdvanceLabels {
    fn default() -> Self {
        Self {
            choice_text: "次へ進む".to_string(),
            continue_description: "ストーリーを続けます。".to_string(),
            finale_description: "ストーリーを完結させます。".to_string(),
        }
    }
}

/// One story's complete authored specification — the sole input to the
/// graph builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySpec {
    pub story_id: StoryId,
    pub title: String,
    pub description: String,
    pub level_jlpt: String,
    pub level_cefr: String,
    pub estimated_time: u32,
    pub shape: GraphShape,
    pub root: ChapterText,
    pub branches: Vec<BranchSpec>,
    pub convergence: ChapterText,
    pub ending: ChapterText,
    #[serde(default)]
    pub advance_labels: AdvanceLabels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_label_defaults() {
        let labels = AdvanceLabels::default();
        assert_eq!(labels.choice_text, "次へ進む");
        assert_eq!(labels.continue_description, "ストーリーを続けます。");
        assert_eq!(labels.finale_description, "ストーリーを完結させます。");
    }

    #[test]
    fn empty_field_detection() {
        let complete = ChapterText::new("本文", "<ruby>本文<rt>ほんぶん</rt></ruby>", "Text");
        assert_eq!(complete.empty_field(), None);

        let no_ruby = ChapterText::new("本文", "", "Text");
        assert_eq!(no_ruby.empty_field(), Some("content_with_ruby"));

        let no_translation = ChapterText::new("本文", "本文", "");
        assert_eq!(no_translation.empty_field(), Some("translation"));
    }

    #[test]
    fn spec_ron_round_trip() {
        let spec = StorySpec {
            story_id: StoryId::new("9"),
            title: "テスト".to_string(),
            description: "説明".to_string(),
            level_jlpt: "N5".to_string(),
            level_cefr: "A1".to_string(),
            estimated_time: 5,
            shape: GraphShape {
                branch_count: 1,
                path_length: 1,
            },
            root: ChapterText::new("一", "一", "one"),
            branches: vec![BranchSpec {
                choice_text: "進む".to_string(),
                choice_description: "先へ。".to_string(),
                path: vec![ChapterText::new("二", "二", "two")],
            }],
            convergence: ChapterText::new("三", "三", "three"),
            ending: ChapterText::new("四", "四", "four"),
            advance_labels: AdvanceLabels::default(),
        };

        let serialized = ron::ser::to_string_pretty(&spec, ron::ser::PrettyConfig::default())
            .expect("serialize spec");
        let parsed: StorySpec = ron::from_str(&serialized).expect("parse spec");
        assert_eq!(parsed, spec);
    }

    #[test]
    fn advance_labels_default_when_omitted() {
        let ron_spec = r#"(
            story_id: "1",
            title: "t",
            description: "d",
            level_jlpt: "N5",
            level_cefr: "A1",
            estimated_time: 5,
            shape: (branch_count: 1, path_length: 1),
            root: (content: "a", content_with_ruby: "a", translation: "a"),
            branches: [(
                choice_text: "c",
                choice_description: "cd",
                path: [(content: "b", content_with_ruby: "b", translation: "b")],
            )],
            convergence: (content: "c", content_with_ruby: "c", translation: "c"),
            ending: (content: "e", content_with_ruby: "e", translation: "e"),
        )"#;
        let parsed: StorySpec = ron::from_str(ron_spec).expect("parse spec");
        assert_eq!(parsed.advance_labels, AdvanceLabels::default());
    }
}
