//! End-to-end generation scenarios

use dg_core::{generate_world_graph, Flow, NodeIndex, Position, WorldGraph, WorldGraphOptions};
use dg_rng::GameRng;
use std::collections::{HashMap, HashSet};

fn generate(depth: u32, count: u32, rng: &mut GameRng) -> WorldGraph {
    generate_world_graph(&WorldGraphOptions::new(depth, count), rng).expect("solvable options")
}

#[test]
fn test_single_goal_at_depth_four() {
    let mut rng = GameRng::from_seed_str("hello");
    let graph = generate(4, 1, &mut rng);

    assert_eq!(graph.node(graph.start()).position, Position::new(0, 0));
    assert_eq!(graph.final_nodes().len(), 1);
    assert_eq!(graph.node(graph.final_nodes()[0]).position, Position::new(1, 0));
    assert_eq!(graph.debug_paths().len(), 2);
}

#[test]
fn test_four_goals_at_depth_five() {
    let mut rng = GameRng::from_seed_str("hello");
    let graph = generate(5, 4, &mut rng);

    let final_keys: HashSet<_> = graph
        .final_nodes()
        .iter()
        .map(|&idx| graph.node(idx).key())
        .collect();
    let start_key = graph.node(graph.start()).key();

    assert_eq!(final_keys.len(), 4);
    assert!(!graph.debug_paths().is_empty());
    for path in graph.debug_paths() {
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], start_key);
        assert!(final_keys.contains(path.last().unwrap()));
    }

    // every goal is the end of at least one path
    let ends: HashSet<_> = graph.debug_paths().iter().filter_map(|p| p.last()).collect();
    assert_eq!(ends.len(), 4);
}

#[test]
fn test_three_goals_at_depth_seven_share_nodes() {
    let mut rng = GameRng::from_seed_str("hello");
    let graph = generate(7, 3, &mut rng);

    let visited: Vec<NodeIndex> = graph.dfs().collect();
    let unique: HashSet<_> = visited.iter().copied().collect();
    assert_eq!(visited.len(), unique.len());
    assert_eq!(visited.len(), graph.node_count());

    let mut by_cell: HashMap<Position, NodeIndex> = HashMap::new();
    for idx in graph.bfs() {
        let position = graph.node(idx).position;
        if let Some(&other) = by_cell.get(&position) {
            assert_eq!(other, idx);
        }
        by_cell.insert(position, idx);
    }
}

#[test]
fn test_every_goal_has_a_predecessor() {
    for seed in ["a", "b", "c", "level-3", "replay"] {
        let mut rng = GameRng::from_seed_str(seed);
        let graph = generate(8, 4, &mut rng);
        for &goal in graph.final_nodes() {
            assert_eq!(graph.node(goal).depth, 8);
            let previous = graph.split_directions(goal).previous;
            assert!(!previous.is_empty(), "seed {}", seed);
            assert!(graph.split_directions(goal).next.is_empty());
        }
    }
}

#[test]
fn test_crowded_goals_connect_for_every_seed() {
    for depth in [7, 11, 16, 23] {
        for count in 1..=6 {
            for seed in 0..12 {
                let mut rng = GameRng::new(seed);
                let options = WorldGraphOptions::new(depth, count);
                let graph = generate_world_graph(&options, &mut rng)
                    .unwrap_or_else(|err| panic!("depth {depth} count {count} seed {seed}: {err}"));
                let ends: HashSet<_> = graph.debug_paths().iter().filter_map(|p| p.last()).collect();
                assert_eq!(ends.len(), count as usize, "depth {depth} count {count} seed {seed}");
            }
        }
    }
}

#[test]
fn test_backward_walk_from_goal_reaches_start() {
    let mut rng = GameRng::new(2024);
    let graph = generate(9, 2, &mut rng);
    for &goal in graph.final_nodes() {
        let back: Vec<_> = graph.bfs_from(goal, Flow::Backward).collect();
        assert!(back.contains(&graph.start()));
        for idx in back {
            assert!(graph.node(idx).depth <= graph.depth());
        }
    }
}

#[test]
fn test_same_seed_same_json() {
    let options = WorldGraphOptions::new(8, 3);
    let mut rng1 = GameRng::from_seed_str("recording-17");
    let mut rng2 = GameRng::from_seed_str("recording-17");

    let a = serde_json::to_string(&generate_world_graph(&options, &mut rng1).unwrap()).unwrap();
    let b = serde_json::to_string(&generate_world_graph(&options, &mut rng2).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_reseed_replays_generation() {
    let options = WorldGraphOptions::from_json_str(r#"{"depth": 10, "finalNodesCount": 2}"#).unwrap();
    let mut rng = GameRng::new(99);
    let first = generate_world_graph(&options, &mut rng).unwrap();
    rng.reseed(99);
    let second = generate_world_graph(&options, &mut rng).unwrap();
    assert_eq!(first.nodes(), second.nodes());
    assert_eq!(first.debug_paths(), second.debug_paths());
}
