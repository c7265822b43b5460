/// Graph construction — one authored story spec to its chapter/choice graph.
///
/// Construction is a pure, deterministic transformation: identifiers are
/// derived from the story id, the branch's variant tag, and the narrative
/// beat, so rebuilding from unchanged input reproduces every id byte for
/// byte. Downstream systems (progress tracking, analytics) key on them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::authoring::{ChapterText, StorySpec};
use crate::schema::chapter::{Chapter, ChapterId};
use crate::schema::choice::{Choice, ChoiceId};
use crate::schema::story::{Story, StoryId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("story '{0}': specification has no branches")]
    NoBranches(StoryId),
    #[error("story '{0}': shape declares a zero-length branch path")]
    ZeroPathLength(StoryId),
    #[error("story '{story_id}': {got} branches authored but shape declares {expected}")]
    BranchCountMismatch {
        story_id: StoryId,
        expected: usize,
        got: usize,
    },
    #[error("story '{story_id}': branch '{tag}' has {got} path chapters, expected {expected}")]
    PathLengthMismatch {
        story_id: StoryId,
        tag: String,
        expected: usize,
        got: usize,
    },
    #[error("story '{story_id}': empty text in {slot}")]
    EmptyText { story_id: StoryId, slot: String },
    #[error("story '{0}': estimated_time must be positive")]
    ZeroEstimatedTime(StoryId),
    #[error("duplicate story id '{0}' in batch")]
    DuplicateStoryId(StoryId),
}

/// One story's fully built graph: the story record plus every chapter and
/// choice, in creation order. This is the unit handed to a persistence
/// sink and to the validator; the builder never emits partial graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryGraph {
    pub story: Story,
    pub chapters: Vec<Chapter>,
    pub choices: Vec<Choice>,
}

/// Variant tag for a branch index: `a`..`z`, then `aa`, `ab`, … like
/// spreadsheet columns. Assigned in input order, so tags are stable
/// across regenerations.
fn variant_tag(index: usize) -> String {
    let mut n = index;
    let mut tag = String::new();
    loop {
        tag.insert(0, (b'a' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    tag
}

fn check_chapter_text(
    story_id: &StoryId,
    text: &ChapterText,
    slot: &str,
) -> Result<(), BuildError> {
    match text.empty_field() {
        Some(field) => Err(BuildError::EmptyText {
            story_id: story_id.clone(),
            slot: format!("{} {}", slot, field),
        }),
        None => Ok(()),
    }
}

fn check_spec(spec: &StorySpec) -> Result<(), BuildError> {
    let sid = &spec.story_id;

    if spec.branches.is_empty() {
        return Err(BuildError::NoBranches(sid.clone()));
    }
    if spec.shape.path_length == 0 {
        return Err(BuildError::ZeroPathLength(sid.clone()));
    }
    if spec.branches.len() != spec.shape.branch_count {
        return Err(BuildError::BranchCountMismatch {
            story_id: sid.clone(),
            expected: spec.shape.branch_count,
            got: spec.branches.len(),
        });
    }
    for (index, branch) in spec.branches.iter().enumerate() {
        if branch.path.len() != spec.shape.path_length {
            return Err(BuildError::PathLengthMismatch {
                story_id: sid.clone(),
                tag: variant_tag(index),
                expected: spec.shape.path_length,
                got: branch.path.len(),
            });
        }
    }
    if spec.estimated_time == 0 {
        return Err(BuildError::ZeroEstimatedTime(sid.clone()));
    }

    let empty = |slot: &str| BuildError::EmptyText {
        story_id: sid.clone(),
        slot: slot.to_string(),
    };
    if spec.title.is_empty() {
        return Err(empty("title"));
    }
    check_chapter_text(sid, &spec.root, "root chapter")?;
    for (index, branch) in spec.branches.iter().enumerate() {
        let tag = variant_tag(index);
        if branch.choice_text.is_empty() {
            return Err(empty(&format!("branch '{}' choice_text", tag)));
        }
        if branch.choice_description.is_empty() {
            return Err(empty(&format!("branch '{}' choice_description", tag)));
        }
        for (step, text) in branch.path.iter().enumerate() {
            let slot = format!("branch '{}' chapter {}", tag, step + 2);
            check_chapter_text(sid, text, &slot)?;
        }
    }
    check_chapter_text(sid, &spec.convergence, "convergence chapter")?;
    check_chapter_text(sid, &spec.ending, "ending chapter")?;
    if spec.advance_labels.choice_text.is_empty()
        || spec.advance_labels.continue_description.is_empty()
        || spec.advance_labels.finale_description.is_empty()
    {
        return Err(empty("advance labels"));
    }
    Ok(())
}

fn make_chapter(
    id: ChapterId,
    story_id: &StoryId,
    number: u32,
    depth: u32,
    parent: Option<ChapterId>,
    text: &ChapterText,
) -> Chapter {
    Chapter {
        chapter_id: id,
        story_id: story_id.clone(),
        chapter_number: number,
        depth_level: depth,
        parent_chapter_id: parent,
        content: text.content.clone(),
        content_with_ruby: text.content_with_ruby.clone(),
        translation: text.translation.clone(),
    }
}

/// Builds the full graph for one story.
///
/// The shape is root → N branch paths of uniform length L → one shared
/// convergence chapter → one terminal chapter. Chapter numbers run
/// 1..=L+3; depth equals chapter number minus one along every path.
pub fn build_story_graph(spec: &StorySpec) -> Result<StoryGraph, BuildError> {
    check_spec(spec)?;

    let sid = &spec.story_id;
    let path_length = spec.shape.path_length as u32;
    let convergence_number = path_length + 2;
    let terminal_number = path_length + 3;

    let root_id = ChapterId::new(format!("ch-{}-1", sid));
    let convergence_id = ChapterId::new(format!("ch-{}-{}", sid, convergence_number));
    let terminal_id = ChapterId::new(format!("ch-{}-{}", sid, terminal_number));

    let branch_count = spec.branches.len();
    let chapter_total = 2 + branch_count * spec.shape.path_length + 1;
    let choice_total = branch_count * (1 + spec.shape.path_length) + 1;
    let mut chapters = Vec::with_capacity(chapter_total);
    let mut choices = Vec::with_capacity(choice_total);

    chapters.push(make_chapter(
        root_id.clone(),
        sid,
        1,
        0,
        None,
        &spec.root,
    ));

    // The root is the decision chapter: one choice per branch, presented
    // in authored order.
    for (index, branch) in spec.branches.iter().enumerate() {
        let tag = variant_tag(index);
        choices.push(Choice {
            choice_id: ChoiceId::new(format!("choice-{}-1-{}", sid, tag)),
            chapter_id: root_id.clone(),
            choice_text: branch.choice_text.clone(),
            choice_description: branch.choice_description.clone(),
            next_chapter_id: ChapterId::new(format!("ch-{}-2{}", sid, tag)),
            display_order: index as u32 + 1,
        });
    }

    // Each branch is a simple path: every chapter on it offers exactly one
    // advance choice, and the last one feeds the shared convergence.
    let labels = &spec.advance_labels;
    for (index, branch) in spec.branches.iter().enumerate() {
        let tag = variant_tag(index);
        let mut parent = root_id.clone();
        for (step, text) in branch.path.iter().enumerate() {
            let number = step as u32 + 2;
            let id = ChapterId::new(format!("ch-{}-{}{}", sid, number, tag));
            chapters.push(make_chapter(
                id.clone(),
                sid,
                number,
                number - 1,
                Some(parent),
                text,
            ));

            let last = step + 1 == branch.path.len();
            let (choice_id, next_id) = if last {
                (
                    ChoiceId::new(format!(
                        "choice-{}-{}{}-to-{}",
                        sid, number, tag, convergence_number
                    )),
                    convergence_id.clone(),
                )
            } else {
                (
                    ChoiceId::new(format!(
                        "choice-{}-{}{}-to-{}{}",
                        sid,
                        number,
                        tag,
                        number + 1,
                        tag
                    )),
                    ChapterId::new(format!("ch-{}-{}{}", sid, number + 1, tag)),
                )
            };
            choices.push(Choice {
                choice_id,
                chapter_id: id.clone(),
                choice_text: labels.choice_text.clone(),
                choice_description: labels.continue_description.clone(),
                next_chapter_id: next_id,
                display_order: 1,
            });
            parent = id;
        }
    }

    // Convergence chapter. Its parent pointer is a display-only pointer to
    // the first branch's last chapter; true topology is the choice set.
    let display_parent = ChapterId::new(format!(
        "ch-{}-{}{}",
        sid,
        path_length + 1,
        variant_tag(0)
    ));
    chapters.push(make_chapter(
        convergence_id.clone(),
        sid,
        convergence_number,
        convergence_number - 1,
        Some(display_parent),
        &spec.convergence,
    ));
    choices.push(Choice {
        choice_id: ChoiceId::new(format!(
            "choice-{}-{}-to-{}",
            sid, convergence_number, terminal_number
        )),
        chapter_id: convergence_id.clone(),
        choice_text: labels.choice_text.clone(),
        choice_description: labels.finale_description.clone(),
        next_chapter_id: terminal_id.clone(),
        display_order: 1,
    });

    // Terminal chapter: no outgoing choices.
    chapters.push(make_chapter(
        terminal_id,
        sid,
        terminal_number,
        terminal_number - 1,
        Some(convergence_id),
        &spec.ending,
    ));

    let story = Story {
        story_id: sid.clone(),
        title: spec.title.clone(),
        description: spec.description.clone(),
        level_jlpt: spec.level_jlpt.clone(),
        level_cefr: spec.level_cefr.clone(),
        estimated_time: spec.estimated_time,
        root_chapter_id: root_id,
    };

    Ok(StoryGraph {
        story,
        chapters,
        choices,
    })
}
