/// Batch seeding — build, validate, and hand each story to a sink.
///
/// Stories are independent: one story's failure never aborts the rest of
/// the batch, and every outcome is reported against its story id.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::core::builder::{build_story_graph, BuildError, StoryGraph};
use crate::core::validator::{validate_story_graph, Violation};
use crate::schema::authoring::StorySpec;
use crate::schema::chapter::Chapter;
use crate::schema::choice::Choice;
use crate::schema::story::{Story, StoryId};

/// A persistence collaborator. Records arrive in dependency order per
/// story: the story record, then its chapters, then its choices. Sinks
/// must reject duplicate story ids; everything else about storage is
/// theirs to decide.
pub trait StorySink {
    type Error: std::error::Error;

    fn create_story(&mut self, story: &Story) -> Result<(), Self::Error>;
    fn create_chapters(&mut self, chapters: &[Chapter]) -> Result<(), Self::Error>;
    fn create_choices(&mut self, choices: &[Choice]) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("malformed specification: {0}")]
    MalformedSpecification(#[from] BuildError),
    #[error("graph failed validation with {} violation(s)", .0.len())]
    ValidationFailure(Vec<Violation>),
    #[error("persistence failed: {0}")]
    PersistenceFailure(String),
}

/// Counts reported for a successfully seeded story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub chapter_count: usize,
    pub choice_count: usize,
}

/// Per-story result of a batch run.
#[derive(Debug)]
pub struct SeedOutcome {
    pub story_id: StoryId,
    pub result: Result<SeedStats, SeedError>,
}

/// Seeds a batch of story specifications into `sink`, one story at a
/// time, returning one outcome per spec in input order. Within a batch
/// the first occurrence of a story id wins; later occurrences fail as
/// malformed.
pub fn seed_stories<S: StorySink>(specs: &[StorySpec], sink: &mut S) -> Vec<SeedOutcome> {
    let mut seen: FxHashSet<StoryId> = FxHashSet::default();
    specs
        .iter()
        .map(|spec| SeedOutcome {
            story_id: spec.story_id.clone(),
            result: seed_one(spec, &mut seen, sink),
        })
        .collect()
}

fn seed_one<S: StorySink>(
    spec: &StorySpec,
    seen: &mut FxHashSet<StoryId>,
    sink: &mut S,
) -> Result<SeedStats, SeedError> {
    if !seen.insert(spec.story_id.clone()) {
        return Err(BuildError::DuplicateStoryId(spec.story_id.clone()).into());
    }

    let graph = build_story_graph(spec)?;
    let violations = validate_story_graph(&graph);
    if !violations.is_empty() {
        return Err(SeedError::ValidationFailure(violations));
    }

    sink.create_story(&graph.story)
        .map_err(|e| SeedError::PersistenceFailure(e.to_string()))?;
    sink.create_chapters(&graph.chapters)
        .map_err(|e| SeedError::PersistenceFailure(e.to_string()))?;
    sink.create_choices(&graph.choices)
        .map_err(|e| SeedError::PersistenceFailure(e.to_string()))?;

    Ok(SeedStats {
        chapter_count: graph.chapters.len(),
        choice_count: graph.choices.len(),
    })
}

#[derive(Debug, Error)]
pub enum GraphFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Save a built story graph to a RON file.
pub fn save_graph(graph: &StoryGraph, path: &std::path::Path) -> Result<(), GraphFileError> {
    let serialized = ron::ser::to_string_pretty(graph, ron::ser::PrettyConfig::default())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Load a built story graph from a RON file.
pub fn load_graph(path: &std::path::Path) -> Result<StoryGraph, GraphFileError> {
    let contents = std::fs::read_to_string(path)?;
    let graph: StoryGraph = ron::from_str(&contents)?;
    Ok(graph)
}

/// Load an authored story specification from a RON file.
pub fn load_spec(path: &std::path::Path) -> Result<StorySpec, GraphFileError> {
    let contents = std::fs::read_to_string(path)?;
    let spec: StorySpec = ron::from_str(&contents)?;
    Ok(spec)
}

#[derive(Debug, Error)]
pub enum MemorySinkError {
    #[error("story '{0}' is already stored")]
    DuplicateStory(StoryId),
}

/// In-memory sink for demos and tests. Append-only per story, with the
/// duplicate-story rejection the sink contract requires.
#[derive(Debug, Default)]
pub struct MemorySink {
    stories: Vec<Story>,
    chapters: Vec<Chapter>,
    choices: Vec<Choice>,
    story_ids: FxHashSet<StoryId>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }
}

impl StorySink for MemorySink {
    type Error = MemorySinkError;

    fn create_story(&mut self, story: &Story) -> Result<(), Self::Error> {
        if !self.story_ids.insert(story.story_id.clone()) {
            return Err(MemorySinkError::DuplicateStory(story.story_id.clone()));
        }
        self.stories.push(story.clone());
        Ok(())
    }

    fn create_chapters(&mut self, chapters: &[Chapter]) -> Result<(), Self::Error> {
        self.chapters.extend_from_slice(chapters);
        Ok(())
    }

    fn create_choices(&mut self, choices: &[Choice]) -> Result<(), Self::Error> {
        self.choices.extend_from_slice(choices);
        Ok(())
    }
}
