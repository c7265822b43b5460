/// Batch seeding integration tests — the full spec → graph → sink path.

use story_graph::core::builder::BuildError;
use story_graph::core::seeder::{
    load_spec, seed_stories, MemorySink, SeedError, StorySink,
};
use story_graph::schema::authoring::StorySpec;
use story_graph::schema::chapter::Chapter;
use story_graph::schema::choice::Choice;
use story_graph::schema::story::{Story, StoryId};

fn corpus_specs() -> Vec<StorySpec> {
    vec![
        load_spec(std::path::Path::new("story_data/tokyo_new_life.ron")).unwrap(),
        load_spec(std::path::Path::new("story_data/first_konbini.ron")).unwrap(),
    ]
}

#[test]
fn corpus_batch_seeds_into_memory_sink() {
    let mut sink = MemorySink::new();
    let outcomes = seed_stories(&corpus_specs(), &mut sink);

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        let stats = outcome
            .result
            .as_ref()
            .unwrap_or_else(|e| panic!("story '{}' failed: {}", outcome.story_id, e));
        assert_eq!(stats.chapter_count, 9);
        assert_eq!(stats.choice_count, 10);
    }

    assert_eq!(sink.stories().len(), 2);
    assert_eq!(sink.chapters().len(), 18);
    assert_eq!(sink.choices().len(), 20);
    assert_eq!(sink.stories()[0].story_id, StoryId::new("1"));
    assert_eq!(sink.stories()[1].story_id, StoryId::new("3"));
}

#[test]
fn one_malformed_spec_leaves_the_rest_of_the_batch_intact() {
    let mut specs = corpus_specs();
    specs[0].branches.clear();

    let mut sink = MemorySink::new();
    let outcomes = seed_stories(&specs, &mut sink);

    assert!(matches!(
        outcomes[0].result,
        Err(SeedError::MalformedSpecification(BuildError::NoBranches(_)))
    ));
    assert!(outcomes[1].result.is_ok());
    assert_eq!(sink.stories().len(), 1);
    assert_eq!(sink.stories()[0].story_id, StoryId::new("3"));
}

#[test]
fn duplicate_story_ids_fail_after_the_first() {
    let mut specs = corpus_specs();
    specs[1].story_id = StoryId::new("1");

    let mut sink = MemorySink::new();
    let outcomes = seed_stories(&specs, &mut sink);

    assert!(outcomes[0].result.is_ok());
    match &outcomes[1].result {
        Err(SeedError::MalformedSpecification(BuildError::DuplicateStoryId(id))) => {
            assert_eq!(*id, StoryId::new("1"));
        }
        other => panic!("expected duplicate story id failure, got {:?}", other),
    }
    assert_eq!(sink.stories().len(), 1);
}

/// Sink that accepts the story record but fails on chapters, standing in
/// for a storage layer that rejects mid-story.
#[derive(Default)]
struct ChapterRejectingSink {
    stories_seen: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("chapter storage unavailable")]
struct ChapterRejection;

impl StorySink for ChapterRejectingSink {
    type Error = ChapterRejection;

    fn create_story(&mut self, _story: &Story) -> Result<(), Self::Error> {
        self.stories_seen += 1;
        Ok(())
    }

    fn create_chapters(&mut self, _chapters: &[Chapter]) -> Result<(), Self::Error> {
        Err(ChapterRejection)
    }

    fn create_choices(&mut self, _choices: &[Choice]) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn sink_failures_are_propagated_with_their_diagnostic() {
    let mut sink = ChapterRejectingSink::default();
    let outcomes = seed_stories(&corpus_specs(), &mut sink);

    for outcome in &outcomes {
        match &outcome.result {
            Err(SeedError::PersistenceFailure(message)) => {
                assert_eq!(message, "chapter storage unavailable");
            }
            other => panic!("expected persistence failure, got {:?}", other),
        }
    }
    // Both stories were attempted; neither failure aborted the batch.
    assert_eq!(sink.stories_seen, 2);
}

#[test]
fn seed_error_messages_name_the_cause() {
    use story_graph::core::validator::Violation;
    use story_graph::schema::chapter::ChapterId;

    let malformed: SeedError = BuildError::NoBranches(StoryId::new("9")).into();
    assert_eq!(
        malformed.to_string(),
        "malformed specification: story '9': specification has no branches"
    );

    let validation = SeedError::ValidationFailure(vec![
        Violation::OrphanChapter {
            chapter_id: ChapterId::new("ch-9-3b"),
        },
        Violation::NoTerminal {
            story_id: StoryId::new("9"),
        },
    ]);
    assert_eq!(
        validation.to_string(),
        "graph failed validation with 2 violation(s)"
    );

    let persistence = SeedError::PersistenceFailure("connection refused".to_string());
    assert_eq!(
        persistence.to_string(),
        "persistence failed: connection refused"
    );
}
