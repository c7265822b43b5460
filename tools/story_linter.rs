/// Story Linter — validates built story graphs against the structural
/// invariants (single root, branch isolation, display-order coverage,
/// depth monotonicity, referential closure).
///
/// Usage: story_linter <graph.ron|dir> [--specs]
///
/// With --specs the inputs are authored specifications instead of built
/// graphs; each is built first and then validated, so authors can lint
/// before seeding.
use std::path::{Path, PathBuf};
use std::process;

use story_graph::core::builder::{build_story_graph, StoryGraph};
use story_graph::core::seeder::{load_graph, load_spec};
use story_graph::core::validator::validate_story_graph;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: story_linter <graph.ron|dir> [--specs]");
        process::exit(0);
    }

    let input = &args[1];
    let as_specs = args.iter().skip(2).any(|a| a == "--specs");

    let files = collect_ron_files(Path::new(input));
    if files.is_empty() {
        eprintln!("ERROR: no .ron files found at '{}'", input);
        process::exit(1);
    }

    let mut graphs: Vec<StoryGraph> = Vec::new();
    for file in &files {
        let graph = if as_specs {
            match load_spec(file) {
                Ok(spec) => match build_story_graph(&spec) {
                    Ok(graph) => graph,
                    Err(e) => {
                        eprintln!("ERROR building {}: {}", file.display(), e);
                        process::exit(1);
                    }
                },
                Err(e) => {
                    eprintln!("ERROR loading {}: {}", file.display(), e);
                    process::exit(1);
                }
            }
        } else {
            match load_graph(file) {
                Ok(graph) => graph,
                Err(e) => {
                    eprintln!("ERROR loading {}: {}", file.display(), e);
                    process::exit(1);
                }
            }
        };
        println!(
            "  Loaded: {} (story '{}', {} chapters, {} choices)",
            file.display(),
            graph.story.story_id,
            graph.chapters.len(),
            graph.choices.len()
        );
        graphs.push(graph);
    }

    println!("\n=== Story Graph Lint Report ===\n");

    let mut total_violations = 0usize;
    for graph in &graphs {
        let violations = validate_story_graph(graph);
        if violations.is_empty() {
            println!("story '{}': OK", graph.story.story_id);
        } else {
            total_violations += violations.len();
            println!(
                "story '{}': {} violation(s)",
                graph.story.story_id,
                violations.len()
            );
            for violation in &violations {
                println!("  ERROR: {}", violation);
            }
        }
    }

    println!(
        "\nSummary: {} graph(s), {} violation(s)",
        graphs.len(),
        total_violations
    );

    if total_violations == 0 {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn collect_ron_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files = Vec::new();
    if path.is_dir() {
        if let Ok(entries) = std::fs::read_dir(path) {
            for entry in entries.flatten() {
                let p = entry.path();
                if p.extension().and_then(|s| s.to_str()) == Some("ron") {
                    files.push(p);
                }
            }
        }
        files.sort();
    }
    files
}
