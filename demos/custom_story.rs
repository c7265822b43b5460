/// Custom Story example — authors a two-branch story in code to show the
/// generalized shape (any branch count, any path length), then validates
/// and seeds it.
///
/// Run with: cargo run --example custom_story

use story_graph::core::builder::build_story_graph;
use story_graph::core::seeder::{seed_stories, MemorySink};
use story_graph::core::validator::validate_story_graph;
use story_graph::schema::authoring::{
    AdvanceLabels, BranchSpec, ChapterText, GraphShape, StorySpec,
};
use story_graph::schema::story::StoryId;

fn main() {
    // A short rainy-day story: one decision, two single-chapter branches.
    let spec = StorySpec {
        story_id: StoryId::new("100"),
        title: "雨の日".to_string(),
        description: "雨の日の過ごし方を選びます。".to_string(),
        level_jlpt: "N5".to_string(),
        level_cefr: "A1".to_string(),
        estimated_time: 3,
        shape: GraphShape {
            branch_count: 2,
            path_length: 1,
        },
        root: ChapterText::new(
            "朝起きると、雨が降っていました。今日は何をしますか？",
            "<ruby>朝<rt>あさ</rt></ruby><ruby>起<rt>お</rt></ruby>きると、<ruby>雨<rt>あめ</rt></ruby>が<ruby>降<rt>ふ</rt></ruby>っていました。<ruby>今日<rt>きょう</rt></ruby>は<ruby>何<rt>なに</rt></ruby>をしますか？",
            "When I woke up in the morning, it was raining. What will you do today?",
        ),
        branches: vec![
            BranchSpec {
                choice_text: "家で本を読む".to_string(),
                choice_description: "温かいお茶と一緒に本を読みます。".to_string(),
                path: vec![ChapterText::new(
                    "ソファで本を読みました。雨の音が静かに聞こえます。",
                    "ソファで<ruby>本<rt>ほん</rt></ruby>を<ruby>読<rt>よ</rt></ruby>みました。<ruby>雨<rt>あめ</rt></ruby>の<ruby>音<rt>おと</rt></ruby>が<ruby>静<rt>しず</rt></ruby>かに<ruby>聞<rt>き</rt></ruby>こえます。",
                    "I read a book on the sofa. I can hear the quiet sound of rain.",
                )],
            },
            BranchSpec {
                choice_text: "傘をさして出かける".to_string(),
                choice_description: "新しい傘をさして、散歩に行きます。".to_string(),
                path: vec![ChapterText::new(
                    "傘をさして公園まで歩きました。雨の公園は人が少なくて、静かでした。",
                    "<ruby>傘<rt>かさ</rt></ruby>をさして<ruby>公園<rt>こうえん</rt></ruby>まで<ruby>歩<rt>ある</rt></ruby>きました。<ruby>雨<rt>あめ</rt></ruby>の<ruby>公園<rt>こうえん</rt></ruby>は<ruby>人<rt>ひと</rt></ruby>が<ruby>少<rt>すく</rt></ruby>なくて、<ruby>静<rt>しず</rt></ruby>かでした。",
                    "I walked to the park with my umbrella. The park in the rain was quiet, with few people.",
                )],
            },
        ],
        convergence: ChapterText::new(
            "午後には雨が止みました。空に虹が出ています。",
            "<ruby>午後<rt>ごご</rt></ruby>には<ruby>雨<rt>あめ</rt></ruby>が<ruby>止<rt>や</rt></ruby>みました。<ruby>空<rt>そら</rt></ruby>に<ruby>虹<rt>にじ</rt></ruby>が<ruby>出<rt>で</rt></ruby>ています。",
            "In the afternoon the rain stopped. There is a rainbow in the sky.",
        ),
        ending: ChapterText::new(
            "静かで良い一日でした。明日は晴れるといいです。",
            "<ruby>静<rt>しず</rt></ruby>かで<ruby>良<rt>よ</rt></ruby>い<ruby>一日<rt>いちにち</rt></ruby>でした。<ruby>明日<rt>あした</rt></ruby>は<ruby>晴<rt>は</rt></ruby>れるといいです。",
            "It was a quiet, good day. I hope it will be sunny tomorrow.",
        ),
        advance_labels: AdvanceLabels::default(),
    };

    let graph = build_story_graph(&spec).expect("Failed to build story graph");
    println!(
        "Built story '{}': {} chapters, {} choices",
        graph.story.story_id,
        graph.chapters.len(),
        graph.choices.len()
    );

    let violations = validate_story_graph(&graph);
    println!("Violations: {}", violations.len());
    for violation in &violations {
        println!("  - {}", violation);
    }

    let mut sink = MemorySink::new();
    let outcomes = seed_stories(&[spec], &mut sink);
    for outcome in &outcomes {
        match &outcome.result {
            Ok(stats) => println!(
                "Seeded story '{}': {} chapters, {} choices",
                outcome.story_id, stats.chapter_count, stats.choice_count
            ),
            Err(e) => println!("Story '{}' failed: {}", outcome.story_id, e),
        }
    }

    // Every chapter id is derived from the story id, beat, and branch tag.
    println!("\nChapter ids:");
    for chapter in sink.chapters() {
        println!(
            "  {} (beat {}, depth {})",
            chapter.chapter_id, chapter.chapter_number, chapter.depth_level
        );
    }
}
