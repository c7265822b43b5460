/// Preview — renders a story graph as a console tree for proofreading.
///
/// Usage: preview <spec.ron|graph.ron> [--graph] [--ruby] [--translation]
///
/// By default the input is an authored specification, built on the fly;
/// pass --graph for an already-built graph file. Chapters are printed in
/// reading order with their choices, indented by depth, so authors can
/// check branch structure and text before seeding.
use std::collections::HashSet;
use std::path::Path;
use std::process;

use story_graph::core::builder::{build_story_graph, StoryGraph};
use story_graph::core::seeder::{load_graph, load_spec};
use story_graph::core::validator::validate_story_graph;
use story_graph::schema::chapter::{strip_ruby, Chapter, ChapterId};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: preview <spec.ron|graph.ron> [--graph] [--ruby] [--translation]");
        process::exit(0);
    }

    let input = Path::new(&args[1]);
    let as_graph = args.iter().skip(2).any(|a| a == "--graph");
    let show_ruby = args.iter().skip(2).any(|a| a == "--ruby");
    let show_translation = args.iter().skip(2).any(|a| a == "--translation");

    let graph = if as_graph {
        load_graph(input).unwrap_or_else(|e| {
            eprintln!("Error loading graph '{}': {}", input.display(), e);
            process::exit(1);
        })
    } else {
        let spec = load_spec(input).unwrap_or_else(|e| {
            eprintln!("Error loading spec '{}': {}", input.display(), e);
            process::exit(1);
        });
        build_story_graph(&spec).unwrap_or_else(|e| {
            eprintln!("Error building story graph: {}", e);
            process::exit(1);
        })
    };

    let violations = validate_story_graph(&graph);
    if !violations.is_empty() {
        eprintln!("WARNING: graph has {} violation(s):", violations.len());
        for violation in &violations {
            eprintln!("  - {}", violation);
        }
        eprintln!();
    }

    let story = &graph.story;
    println!(
        "{} ({} / {}, ~{} min)",
        story.title, story.level_jlpt, story.level_cefr, story.estimated_time
    );
    println!("{}\n", story.description);

    let mut printed: HashSet<String> = HashSet::new();
    print_subtree(
        &graph,
        &story.root_chapter_id,
        0,
        show_ruby,
        show_translation,
        &mut printed,
    );
}

fn chapter<'a>(graph: &'a StoryGraph, id: &ChapterId) -> Option<&'a Chapter> {
    graph.chapters.iter().find(|c| c.chapter_id == *id)
}

/// Prints a chapter and, recursively, everything below it. A convergence
/// chapter is entered by several choices; it is printed in full on the
/// first visit and referenced by id afterwards.
fn print_subtree(
    graph: &StoryGraph,
    id: &ChapterId,
    depth: usize,
    show_ruby: bool,
    show_translation: bool,
    printed: &mut HashSet<String>,
) {
    let indent = "    ".repeat(depth);
    let Some(chapter) = chapter(graph, id) else {
        println!("{}[missing chapter '{}']", indent, id);
        return;
    };

    let entries = graph
        .choices
        .iter()
        .filter(|c| c.next_chapter_id == *id)
        .count();
    if entries > 1 && !printed.insert(id.as_str().to_string()) {
        println!("{}-> continues at [{}]", indent, id);
        return;
    }

    let text = if show_ruby {
        chapter.content_with_ruby.clone()
    } else {
        strip_ruby(&chapter.content_with_ruby)
    };
    println!("{}[{}] {}", indent, chapter.chapter_id, text);
    if show_translation {
        println!("{}    ({})", indent, chapter.translation);
    }

    for choice in graph.choices.iter().filter(|c| c.chapter_id == *id) {
        println!(
            "{}  ({}) {} -- {}",
            indent, choice.display_order, choice.choice_text, choice.choice_description
        );
        print_subtree(
            graph,
            &choice.next_chapter_id,
            depth + 1,
            show_ruby,
            show_translation,
            printed,
        );
    }
}
