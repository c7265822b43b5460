/// Seed Stories — builds and validates story graphs from authored specs.
///
/// Usage: seed_stories --input <spec.ron|dir> --output <dir>
///
/// Reads one or more authored story specifications (RON), builds each
/// chapter/choice graph, validates it, and writes one `<story_id>.ron`
/// graph file per valid story into the output directory. Prints one
/// outcome line per story; exits non-zero if any story failed.
use std::path::{Path, PathBuf};
use std::process;

use story_graph::core::seeder::{
    load_spec, save_graph, seed_stories, SeedError, StorySink,
};
use story_graph::core::builder::StoryGraph;
use story_graph::schema::authoring::StorySpec;
use story_graph::schema::chapter::Chapter;
use story_graph::schema::choice::Choice;
use story_graph::schema::story::{Story, StoryId};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut input = None;
    let mut output = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" if i + 1 < args.len() => {
                i += 1;
                input = Some(args[i].clone());
            }
            "--output" if i + 1 < args.len() => {
                i += 1;
                output = Some(args[i].clone());
            }
            "--help" | "-h" => {
                println!("Usage: seed_stories --input <spec.ron|dir> --output <dir>");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input_path = input.unwrap_or_else(|| {
        eprintln!("Error: --input is required");
        eprintln!("Usage: seed_stories --input <spec.ron|dir> --output <dir>");
        process::exit(1);
    });
    let output_dir = output.unwrap_or_else(|| {
        eprintln!("Error: --output is required");
        eprintln!("Usage: seed_stories --input <spec.ron|dir> --output <dir>");
        process::exit(1);
    });

    let specs = load_specs(Path::new(&input_path));
    if specs.is_empty() {
        eprintln!("Error: no story specifications found at '{}'", input_path);
        process::exit(1);
    }
    println!("Loaded {} story specification(s)", specs.len());

    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        eprintln!("Error creating output directory '{}': {}", output_dir, e);
        process::exit(1);
    }

    let mut sink = DirectorySink::new(PathBuf::from(&output_dir));
    let outcomes = seed_stories(&specs, &mut sink);

    let mut failures = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(stats) => println!(
                "Seeded story '{}': {} chapters, {} choices",
                outcome.story_id, stats.chapter_count, stats.choice_count
            ),
            Err(SeedError::ValidationFailure(violations)) => {
                failures += 1;
                eprintln!(
                    "FAILED story '{}': {} violation(s)",
                    outcome.story_id,
                    violations.len()
                );
                for violation in violations {
                    eprintln!("  - {}", violation);
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("FAILED story '{}': {}", outcome.story_id, e);
            }
        }
    }

    println!(
        "\nSummary: {} seeded, {} failed",
        outcomes.len() - failures,
        failures
    );

    if failures == 0 {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_specs(path: &Path) -> Vec<StorySpec> {
    let mut specs = Vec::new();
    if path.is_file() {
        match load_spec(path) {
            Ok(spec) => specs.push(spec),
            Err(e) => {
                eprintln!("Error loading spec '{}': {}", path.display(), e);
                process::exit(1);
            }
        }
    } else if path.is_dir() {
        let mut files: Vec<PathBuf> = match std::fs::read_dir(path) {
            Ok(entries) => entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("ron"))
                .collect(),
            Err(e) => {
                eprintln!("Error reading directory '{}': {}", path.display(), e);
                process::exit(1);
            }
        };
        // Filename order keeps batch order reproducible.
        files.sort();
        for file in files {
            match load_spec(&file) {
                Ok(spec) => {
                    println!("  Loaded: {}", file.display());
                    specs.push(spec);
                }
                Err(e) => {
                    eprintln!("  ERROR loading {}: {}", file.display(), e);
                    process::exit(1);
                }
            }
        }
    } else {
        eprintln!("Error: path '{}' does not exist", path.display());
        process::exit(1);
    }
    specs
}

/// Sink that writes one graph RON file per story. Records arrive in
/// story → chapters → choices order, so the graph is assembled across
/// the three calls and written on the last one.
struct DirectorySink {
    dir: PathBuf,
    pending_story: Option<Story>,
    pending_chapters: Vec<Chapter>,
    written: Vec<StoryId>,
}

#[derive(Debug, thiserror::Error)]
enum DirectorySinkError {
    #[error("story '{0}' was already written")]
    DuplicateStory(StoryId),
    #[error("chapters arrived before their story record")]
    OutOfOrder,
    #[error("{0}")]
    File(#[from] story_graph::core::seeder::GraphFileError),
}

impl DirectorySink {
    fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            pending_story: None,
            pending_chapters: Vec::new(),
            written: Vec::new(),
        }
    }
}

impl StorySink for DirectorySink {
    type Error = DirectorySinkError;

    fn create_story(&mut self, story: &Story) -> Result<(), Self::Error> {
        if self.written.contains(&story.story_id) {
            return Err(DirectorySinkError::DuplicateStory(story.story_id.clone()));
        }
        self.pending_story = Some(story.clone());
        self.pending_chapters.clear();
        Ok(())
    }

    fn create_chapters(&mut self, chapters: &[Chapter]) -> Result<(), Self::Error> {
        if self.pending_story.is_none() {
            return Err(DirectorySinkError::OutOfOrder);
        }
        self.pending_chapters = chapters.to_vec();
        Ok(())
    }

    fn create_choices(&mut self, choices: &[Choice]) -> Result<(), Self::Error> {
        let story = self
            .pending_story
            .take()
            .ok_or(DirectorySinkError::OutOfOrder)?;
        let story_id = story.story_id.clone();
        let graph = StoryGraph {
            story,
            chapters: std::mem::take(&mut self.pending_chapters),
            choices: choices.to_vec(),
        };
        let file = self.dir.join(format!("{}.ron", story_id));
        save_graph(&graph, &file)?;
        self.written.push(story_id);
        Ok(())
    }
}
