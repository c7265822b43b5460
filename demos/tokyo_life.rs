/// Tokyo Life example — seeds the Tokyo new-life story from its authored
/// RON specification and walks one reading path.
///
/// Run with: cargo run --example tokyo_life

use story_graph::core::builder::build_story_graph;
use story_graph::core::seeder::{load_spec, seed_stories, MemorySink};
use story_graph::schema::chapter::strip_ruby;

fn main() {
    let spec = load_spec(std::path::Path::new("story_data/tokyo_new_life.ron"))
        .expect("Failed to load story spec");

    // --- Seed into an in-memory sink ---
    let mut sink = MemorySink::new();
    let outcomes = seed_stories(&[spec.clone()], &mut sink);
    for outcome in &outcomes {
        match &outcome.result {
            Ok(stats) => println!(
                "Seeded story '{}': {} chapters, {} choices",
                outcome.story_id, stats.chapter_count, stats.choice_count
            ),
            Err(e) => println!("Story '{}' failed: {}", outcome.story_id, e),
        }
    }

    // --- Walk the first branch from root to ending ---
    let graph = build_story_graph(&spec).expect("Failed to build story graph");
    println!("\n=== {} ===\n", graph.story.title);

    let mut current = graph.story.root_chapter_id.clone();
    loop {
        let chapter = graph
            .chapters
            .iter()
            .find(|c| c.chapter_id == current)
            .expect("chapter exists");
        println!("{}\n", strip_ruby(&chapter.content_with_ruby));

        let mut offered: Vec<_> = graph
            .choices
            .iter()
            .filter(|c| c.chapter_id == current)
            .collect();
        if offered.is_empty() {
            println!("--- おわり ---");
            break;
        }
        offered.sort_by_key(|c| c.display_order);
        for choice in &offered {
            println!("  ({}) {}", choice.display_order, choice.choice_text);
        }
        // Always take the first option.
        let taken = offered[0];
        println!("-> {}\n", taken.choice_text);
        current = taken.next_chapter_id.clone();
    }
}
