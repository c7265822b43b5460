/// Structural validation of built story graphs.
///
/// Runs as an explicit pass after construction, so hand-authored or
/// edited graphs can be checked with the same code as builder output.
/// All violations are collected in one deterministic pass order; the
/// graph is never mutated. Topology is judged from the choice set;
/// parent pointers are checked only for tree-rendering coherence.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::core::builder::StoryGraph;
use crate::schema::chapter::{Chapter, ChapterId};
use crate::schema::choice::{Choice, ChoiceId};
use crate::schema::story::StoryId;

fn join_chapters(ids: &[ChapterId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_choices(ids: &[ChoiceId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One invariant violation, naming the offending entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("chapter id '{0}' is defined more than once")]
    DuplicateChapterId(ChapterId),
    #[error("choice id '{0}' is defined more than once")]
    DuplicateChoiceId(ChoiceId),
    #[error("chapter '{chapter_id}' belongs to story '{actual}', not '{expected}'")]
    ForeignChapter {
        chapter_id: ChapterId,
        expected: StoryId,
        actual: StoryId,
    },
    #[error("story '{story_id}': root chapter '{root_chapter_id}' is not defined")]
    UnknownRoot {
        story_id: StoryId,
        root_chapter_id: ChapterId,
    },
    #[error("chapter '{chapter_id}': parent chapter '{parent_chapter_id}' is not defined in the story")]
    UnknownParent {
        chapter_id: ChapterId,
        parent_chapter_id: ChapterId,
    },
    #[error("choice '{choice_id}': source chapter '{chapter_id}' is not defined in the story")]
    UnknownChoiceSource {
        choice_id: ChoiceId,
        chapter_id: ChapterId,
    },
    #[error("choice '{choice_id}': target chapter '{next_chapter_id}' is not defined in the story")]
    UnknownChoiceTarget {
        choice_id: ChoiceId,
        next_chapter_id: ChapterId,
    },
    #[error("chapter '{chapter_id}' has no parent but is not the root")]
    ExtraParentless { chapter_id: ChapterId },
    #[error("root chapter '{chapter_id}' must not have a parent")]
    RootHasParent { chapter_id: ChapterId },
    #[error("root chapter '{chapter_id}': depth_level must be 0, found {actual}")]
    RootDepthNonZero { chapter_id: ChapterId, actual: u32 },
    #[error("chapter '{chapter_id}': depth_level {actual} does not equal parent depth + 1 ({expected})")]
    ParentDepthMismatch {
        chapter_id: ChapterId,
        expected: u32,
        actual: u32,
    },
    #[error("choice '{choice_id}' targets the root chapter")]
    RootHasIncoming { choice_id: ChoiceId },
    #[error("chapter '{chapter_id}' has no incoming choice but is not the root")]
    OrphanChapter { chapter_id: ChapterId },
    #[error("story '{story_id}': no terminal chapter: every chapter has at least one outgoing choice")]
    NoTerminal { story_id: StoryId },
    #[error("story '{story_id}': multiple terminal chapters: {}", join_chapters(.chapter_ids))]
    MultipleTerminals {
        story_id: StoryId,
        chapter_ids: Vec<ChapterId>,
    },
    #[error("chapter '{next_chapter_id}' is entered by multiple choices: {}", join_choices(.choice_ids))]
    DuplicateDestination {
        next_chapter_id: ChapterId,
        choice_ids: Vec<ChoiceId>,
    },
    #[error("chapter '{chapter_id}': display_order {display_order} is used by more than one choice")]
    DuplicateDisplayOrder {
        chapter_id: ChapterId,
        display_order: u32,
    },
    #[error("chapter '{chapter_id}': display orders of {count} choices do not form a gapless run from 1")]
    DisplayOrderGap { chapter_id: ChapterId, count: usize },
    #[error("choice '{choice_id}': depth does not increase ({from_depth} to {to_depth})")]
    NonMonotonicDepth {
        choice_id: ChoiceId,
        from_depth: u32,
        to_depth: u32,
    },
    #[error("chapter '{chapter_id}' is on a choice cycle")]
    CycleDetected { chapter_id: ChapterId },
    #[error("chapter '{chapter_id}' is not reachable from the root")]
    UnreachableChapter { chapter_id: ChapterId },
}

/// Checks every structural invariant of a story graph and returns the
/// full ordered violation list; an empty list means the graph is valid.
pub fn validate_story_graph(graph: &StoryGraph) -> Vec<Violation> {
    let mut violations = Vec::new();
    let story_id = &graph.story.story_id;
    let root_id = &graph.story.root_chapter_id;

    // Chapter index; duplicate definitions keep the last occurrence.
    let mut by_id: FxHashMap<&ChapterId, &Chapter> = FxHashMap::default();
    for chapter in &graph.chapters {
        if by_id.insert(&chapter.chapter_id, chapter).is_some() {
            violations.push(Violation::DuplicateChapterId(chapter.chapter_id.clone()));
        }
    }
    let mut seen_choice_ids: FxHashSet<&ChoiceId> = FxHashSet::default();
    for choice in &graph.choices {
        if !seen_choice_ids.insert(&choice.choice_id) {
            violations.push(Violation::DuplicateChoiceId(choice.choice_id.clone()));
        }
    }

    for chapter in &graph.chapters {
        if chapter.story_id != *story_id {
            violations.push(Violation::ForeignChapter {
                chapter_id: chapter.chapter_id.clone(),
                expected: story_id.clone(),
                actual: chapter.story_id.clone(),
            });
        }
    }

    let root_known = by_id.contains_key(root_id);
    if !root_known {
        violations.push(Violation::UnknownRoot {
            story_id: story_id.clone(),
            root_chapter_id: root_id.clone(),
        });
    }

    // Parent pointers: closure, uniqueness of the parentless chapter, and
    // depth coherence along the display tree.
    for chapter in &graph.chapters {
        let is_root = chapter.chapter_id == *root_id;
        match &chapter.parent_chapter_id {
            None => {
                if !is_root {
                    violations.push(Violation::ExtraParentless {
                        chapter_id: chapter.chapter_id.clone(),
                    });
                } else if chapter.depth_level != 0 {
                    violations.push(Violation::RootDepthNonZero {
                        chapter_id: chapter.chapter_id.clone(),
                        actual: chapter.depth_level,
                    });
                }
            }
            Some(parent_id) => {
                if is_root {
                    violations.push(Violation::RootHasParent {
                        chapter_id: chapter.chapter_id.clone(),
                    });
                    continue;
                }
                match by_id.get(parent_id) {
                    None => violations.push(Violation::UnknownParent {
                        chapter_id: chapter.chapter_id.clone(),
                        parent_chapter_id: parent_id.clone(),
                    }),
                    Some(parent) => {
                        let expected = parent.depth_level + 1;
                        if chapter.depth_level != expected {
                            violations.push(Violation::ParentDepthMismatch {
                                chapter_id: chapter.chapter_id.clone(),
                                expected,
                                actual: chapter.depth_level,
                            });
                        }
                    }
                }
            }
        }
    }

    // Choice endpoint closure; adjacency over the resolvable edges.
    let mut outgoing: FxHashMap<&ChapterId, Vec<&Choice>> = FxHashMap::default();
    let mut incoming: FxHashMap<&ChapterId, Vec<&Choice>> = FxHashMap::default();
    for choice in &graph.choices {
        let source_known = by_id.contains_key(&choice.chapter_id);
        if !source_known {
            violations.push(Violation::UnknownChoiceSource {
                choice_id: choice.choice_id.clone(),
                chapter_id: choice.chapter_id.clone(),
            });
        }
        let target_known = by_id.contains_key(&choice.next_chapter_id);
        if !target_known {
            violations.push(Violation::UnknownChoiceTarget {
                choice_id: choice.choice_id.clone(),
                next_chapter_id: choice.next_chapter_id.clone(),
            });
        }
        if source_known && target_known {
            outgoing.entry(&choice.chapter_id).or_default().push(choice);
            incoming
                .entry(&choice.next_chapter_id)
                .or_default()
                .push(choice);
        }
    }

    // Exactly one in-degree-0 chapter (the root) and exactly one
    // out-degree-0 chapter (the terminal).
    if let Some(into_root) = incoming.get(root_id) {
        for choice in into_root {
            violations.push(Violation::RootHasIncoming {
                choice_id: choice.choice_id.clone(),
            });
        }
    }
    for chapter in &graph.chapters {
        if chapter.chapter_id != *root_id && !incoming.contains_key(&chapter.chapter_id) {
            violations.push(Violation::OrphanChapter {
                chapter_id: chapter.chapter_id.clone(),
            });
        }
    }
    let terminals: Vec<ChapterId> = graph
        .chapters
        .iter()
        .filter(|c| !outgoing.contains_key(&c.chapter_id))
        .map(|c| c.chapter_id.clone())
        .collect();
    if terminals.is_empty() {
        violations.push(Violation::NoTerminal {
            story_id: story_id.clone(),
        });
    } else if terminals.len() > 1 {
        violations.push(Violation::MultipleTerminals {
            story_id: story_id.clone(),
            chapter_ids: terminals,
        });
    }

    // Display orders per chapter: unique and gapless from 1.
    for chapter in &graph.chapters {
        let Some(list) = outgoing.get(&chapter.chapter_id) else {
            continue;
        };
        let mut orders: Vec<u32> = list.iter().map(|c| c.display_order).collect();
        orders.sort_unstable();
        let mut duplicated = false;
        let mut reported: FxHashSet<u32> = FxHashSet::default();
        for pair in orders.windows(2) {
            if pair[0] == pair[1] {
                duplicated = true;
                if reported.insert(pair[0]) {
                    violations.push(Violation::DuplicateDisplayOrder {
                        chapter_id: chapter.chapter_id.clone(),
                        display_order: pair[0],
                    });
                }
            }
        }
        let gapless = orders
            .iter()
            .enumerate()
            .all(|(i, order)| *order == i as u32 + 1);
        if !duplicated && !gapless {
            violations.push(Violation::DisplayOrderGap {
                chapter_id: chapter.chapter_id.clone(),
                count: orders.len(),
            });
        }
    }

    // Destination discipline. Two choices may enter the same chapter only
    // at a convergence point: the single chapter of its narrative beat.
    // A chapter at a multi-variant beat belongs to one branch, so a
    // second edge into it crosses branches; two edges from one source
    // chapter are duplicates outright.
    let mut beat_sizes: FxHashMap<u32, u32> = FxHashMap::default();
    for chapter in &graph.chapters {
        *beat_sizes.entry(chapter.chapter_number).or_default() += 1;
    }
    let mut reported_targets: FxHashSet<&ChapterId> = FxHashSet::default();
    for choice in &graph.choices {
        let target = &choice.next_chapter_id;
        if reported_targets.contains(target) {
            continue;
        }
        let Some(entering) = incoming.get(target) else {
            continue;
        };
        if entering.len() < 2 {
            continue;
        }
        let sources: FxHashSet<&ChapterId> = entering.iter().map(|c| &c.chapter_id).collect();
        let same_source = sources.len() < entering.len();
        let multi_variant = by_id
            .get(target)
            .map(|t| beat_sizes.get(&t.chapter_number).copied().unwrap_or(0) >= 2)
            .unwrap_or(false);
        if same_source || multi_variant {
            reported_targets.insert(target);
            violations.push(Violation::DuplicateDestination {
                next_chapter_id: target.clone(),
                choice_ids: entering.iter().map(|c| c.choice_id.clone()).collect(),
            });
        }
    }

    // Depth must strictly increase along every choice edge.
    for choice in &graph.choices {
        if let (Some(source), Some(target)) = (
            by_id.get(&choice.chapter_id),
            by_id.get(&choice.next_chapter_id),
        ) {
            if target.depth_level <= source.depth_level {
                violations.push(Violation::NonMonotonicDepth {
                    choice_id: choice.choice_id.clone(),
                    from_depth: source.depth_level,
                    to_depth: target.depth_level,
                });
            }
        }
    }

    // Cycle detection, reported distinctly from the depth check: a path
    // revisiting a chapter is CycleDetected on the revisited chapter.
    find_cycles(graph, &outgoing, &mut violations);

    // Every chapter must be reachable from the root.
    if root_known {
        let mut visited: FxHashSet<&ChapterId> = FxHashSet::default();
        let mut queue = vec![root_id];
        visited.insert(root_id);
        while let Some(id) = queue.pop() {
            if let Some(list) = outgoing.get(id) {
                for choice in list {
                    if visited.insert(&choice.next_chapter_id) {
                        queue.push(&choice.next_chapter_id);
                    }
                }
            }
        }
        for chapter in &graph.chapters {
            if !visited.contains(&chapter.chapter_id) {
                violations.push(Violation::UnreachableChapter {
                    chapter_id: chapter.chapter_id.clone(),
                });
            }
        }
    }

    violations
}

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

fn find_cycles<'a>(
    graph: &'a StoryGraph,
    outgoing: &FxHashMap<&'a ChapterId, Vec<&'a Choice>>,
    violations: &mut Vec<Violation>,
) {
    let mut color: FxHashMap<&ChapterId, u8> = FxHashMap::default();
    let mut flagged: FxHashSet<&ChapterId> = FxHashSet::default();

    for start in &graph.chapters {
        if color.get(&start.chapter_id).copied().unwrap_or(WHITE) != WHITE {
            continue;
        }
        // Iterative DFS; an edge into a gray chapter closes a cycle.
        let mut stack: Vec<(&ChapterId, usize)> = vec![(&start.chapter_id, 0)];
        color.insert(&start.chapter_id, GRAY);
        while let Some(&(id, child_index)) = stack.last() {
            let children = outgoing.get(id).map(Vec::as_slice).unwrap_or(&[]);
            if child_index < children.len() {
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let target = &children[child_index].next_chapter_id;
                match color.get(target).copied().unwrap_or(WHITE) {
                    WHITE => {
                        color.insert(target, GRAY);
                        stack.push((target, 0));
                    }
                    GRAY => {
                        if flagged.insert(target) {
                            violations.push(Violation::CycleDetected {
                                chapter_id: target.clone(),
                            });
                        }
                    }
                    _ => {}
                }
            } else {
                color.insert(id, BLACK);
                stack.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::build_story_graph;
    use crate::schema::authoring::{
        AdvanceLabels, BranchSpec, ChapterText, GraphShape, StorySpec,
    };

    fn text(label: &str) -> ChapterText {
        ChapterText::new(
            format!("{}。", label),
            format!("{}。", label),
            format!("{}.", label),
        )
    }

    fn built_graph(branch_count: usize, path_length: usize) -> StoryGraph {
        let spec = StorySpec {
            story_id: StoryId::new("1"),
            title: "検証用".to_string(),
            description: "検証のための物語。".to_string(),
            level_jlpt: "N5".to_string(),
            level_cefr: "A1".to_string(),
            estimated_time: 5,
            shape: GraphShape {
                branch_count,
                path_length,
            },
            root: text("導入"),
            branches: (0..branch_count)
                .map(|i| BranchSpec {
                    choice_text: format!("選択{}", i + 1),
                    choice_description: format!("選択{}の説明。", i + 1),
                    path: (0..path_length).map(|s| text(&format!("枝{}-{}", i, s))).collect(),
                })
                .collect(),
            convergence: text("合流"),
            ending: text("結末"),
            advance_labels: AdvanceLabels::default(),
        };
        build_story_graph(&spec).unwrap()
    }

    fn choice_mut<'a>(graph: &'a mut StoryGraph, id: &str) -> &'a mut Choice {
        graph
            .choices
            .iter_mut()
            .find(|c| c.choice_id.as_str() == id)
            .unwrap()
    }

    #[test]
    fn builder_output_validates_clean() {
        for (n, l) in [(1, 1), (2, 2), (3, 2), (4, 3)] {
            let graph = built_graph(n, l);
            assert_eq!(validate_story_graph(&graph), Vec::new());
        }
    }

    #[test]
    fn cross_branch_edge_is_duplicate_destination() {
        let mut graph = built_graph(2, 2);
        // Point branch b's advance at branch a's chapter 3.
        choice_mut(&mut graph, "choice-1-2b-to-3b").next_chapter_id = ChapterId::new("ch-1-3a");

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::DuplicateDestination {
            next_chapter_id: ChapterId::new("ch-1-3a"),
            choice_ids: vec![
                ChoiceId::new("choice-1-2a-to-3a"),
                ChoiceId::new("choice-1-2b-to-3b"),
            ],
        }));
        // The abandoned variant chapter is now an orphan as well.
        assert!(violations.contains(&Violation::OrphanChapter {
            chapter_id: ChapterId::new("ch-1-3b"),
        }));
    }

    #[test]
    fn duplicate_destination_from_one_chapter() {
        let mut graph = built_graph(2, 1);
        choice_mut(&mut graph, "choice-1-1-b").next_chapter_id = ChapterId::new("ch-1-2a");

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::DuplicateDestination {
            next_chapter_id: ChapterId::new("ch-1-2a"),
            choice_ids: vec![
                ChoiceId::new("choice-1-1-a"),
                ChoiceId::new("choice-1-1-b"),
            ],
        }));
    }

    #[test]
    fn convergence_in_degree_is_not_a_violation() {
        let graph = built_graph(3, 2);
        let violations = validate_story_graph(&graph);
        assert!(!violations
            .iter()
            .any(|v| matches!(v, Violation::DuplicateDestination { .. })));
    }

    #[test]
    fn terminal_with_outgoing_choice() {
        let mut graph = built_graph(2, 2);
        graph.choices.push(Choice {
            choice_id: ChoiceId::new("choice-1-5-to-4"),
            chapter_id: ChapterId::new("ch-1-5"),
            choice_text: "戻る".to_string(),
            choice_description: "合流章に戻ります。".to_string(),
            next_chapter_id: ChapterId::new("ch-1-4"),
            display_order: 1,
        });

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::NoTerminal {
            story_id: StoryId::new("1"),
        }));
        assert!(violations.contains(&Violation::NonMonotonicDepth {
            choice_id: ChoiceId::new("choice-1-5-to-4"),
            from_depth: 4,
            to_depth: 3,
        }));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::CycleDetected { .. })));
    }

    #[test]
    fn dangling_choice_target() {
        let mut graph = built_graph(2, 1);
        choice_mut(&mut graph, "choice-1-3-to-4").next_chapter_id = ChapterId::new("ch-1-99");

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::UnknownChoiceTarget {
            choice_id: ChoiceId::new("choice-1-3-to-4"),
            next_chapter_id: ChapterId::new("ch-1-99"),
        }));
    }

    #[test]
    fn dangling_parent_pointer() {
        let mut graph = built_graph(2, 1);
        let chapter = graph
            .chapters
            .iter_mut()
            .find(|c| c.chapter_id.as_str() == "ch-1-2b")
            .unwrap();
        chapter.parent_chapter_id = Some(ChapterId::new("ch-1-0"));

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::UnknownParent {
            chapter_id: ChapterId::new("ch-1-2b"),
            parent_chapter_id: ChapterId::new("ch-1-0"),
        }));
    }

    #[test]
    fn depth_tamper_is_caught_on_parent_and_edges() {
        let mut graph = built_graph(2, 2);
        let chapter = graph
            .chapters
            .iter_mut()
            .find(|c| c.chapter_id.as_str() == "ch-1-3a")
            .unwrap();
        chapter.depth_level = 1;

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::ParentDepthMismatch {
            chapter_id: ChapterId::new("ch-1-3a"),
            expected: 2,
            actual: 1,
        }));
        // The edge into the tampered chapter no longer gains depth.
        assert!(violations.contains(&Violation::NonMonotonicDepth {
            choice_id: ChoiceId::new("choice-1-2a-to-3a"),
            from_depth: 1,
            to_depth: 1,
        }));
    }

    #[test]
    fn display_order_gap_and_duplicate() {
        let mut graph = built_graph(3, 1);
        choice_mut(&mut graph, "choice-1-1-c").display_order = 5;
        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::DisplayOrderGap {
            chapter_id: ChapterId::new("ch-1-1"),
            count: 3,
        }));

        let mut graph = built_graph(3, 1);
        choice_mut(&mut graph, "choice-1-1-c").display_order = 1;
        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::DuplicateDisplayOrder {
            chapter_id: ChapterId::new("ch-1-1"),
            display_order: 1,
        }));
    }

    #[test]
    fn foreign_chapter_is_rejected() {
        let mut graph = built_graph(2, 1);
        graph.chapters[1].story_id = StoryId::new("2");

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::ForeignChapter {
            chapter_id: graph.chapters[1].chapter_id.clone(),
            expected: StoryId::new("1"),
            actual: StoryId::new("2"),
        }));
    }

    #[test]
    fn duplicate_chapter_definition() {
        let mut graph = built_graph(2, 1);
        let copy = graph.chapters[2].clone();
        graph.chapters.push(copy);

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::DuplicateChapterId(
            graph.chapters[2].chapter_id.clone()
        )));
    }

    #[test]
    fn choice_into_root_is_reported() {
        let mut graph = built_graph(2, 1);
        choice_mut(&mut graph, "choice-1-3-to-4").next_chapter_id = ChapterId::new("ch-1-1");

        let violations = validate_story_graph(&graph);
        assert!(violations.contains(&Violation::RootHasIncoming {
            choice_id: ChoiceId::new("choice-1-3-to-4"),
        }));
    }

    #[test]
    fn violation_messages_name_entities() {
        let violation = Violation::DuplicateDestination {
            next_chapter_id: ChapterId::new("ch-1-3a"),
            choice_ids: vec![
                ChoiceId::new("choice-1-2a-to-3a"),
                ChoiceId::new("choice-1-2b-to-3b"),
            ],
        };
        assert_eq!(
            violation.to_string(),
            "chapter 'ch-1-3a' is entered by multiple choices: choice-1-2a-to-3a, choice-1-2b-to-3b"
        );
    }
}
