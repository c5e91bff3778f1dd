//! The generated world graph and its entry point

use dg_rng::GameRng;
use hashbrown::HashMap;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::direction::Direction;
use super::key::{NodeKey, Position, PositionKey};
use super::node::{Node, NodeIndex};
use super::placement::place_final_nodes;
use super::search::SearchContext;
use super::traversal::{self, Bfs, Dfs, DirectionSplit, Flow};
use crate::error::{GraphError, Result};
use crate::options::WorldGraphOptions;

/// Summary numbers for logs and debug overlays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub final_nodes: usize,
    pub paths: usize,
    pub max_out_degree: usize,
    /// Nodes reached by more than one parent
    pub merged_nodes: usize,
}

/// Immutable dungeon graph handed to the level builder
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldGraph {
    nodes: Vec<Node>,
    start: NodeIndex,
    final_nodes: Vec<NodeIndex>,
    depth: u32,
    debug_paths: Vec<Vec<NodeKey>>,
    #[serde(skip)]
    by_position: HashMap<PositionKey, NodeIndex>,
}

/// Fresh searches tried before giving up on a set of options
pub const MAX_ATTEMPTS: u32 = 16;

/// Generate a dungeon graph for `options`, drawing branch order from `rng`.
///
/// Same seed and options give the same graph. A search that leaves a final
/// node unconnected is thrown away and started again from an empty arena,
/// continuing the same random stream, up to [`MAX_ATTEMPTS`] times. Any
/// error after that means the options describe a level that cannot be
/// built; retry with other options.
pub fn generate_world_graph(options: &WorldGraphOptions, rng: &mut GameRng) -> Result<WorldGraph> {
    options.validate()?;
    debug!(
        depth = options.depth,
        final_nodes = options.final_nodes_count,
        seed = rng.seed(),
        "generating world graph"
    );

    let positions = place_final_nodes(options.depth, options.final_nodes_count)?;

    let mut attempt = 1;
    let graph = loop {
        match build_attempt(options.depth, &positions, rng) {
            Ok(graph) => break graph,
            Err(err @ (GraphError::Unsolvable { .. } | GraphError::OrphanFinalNode { .. }))
                if attempt < MAX_ATTEMPTS =>
            {
                debug!(attempt, %err, "search attempt failed, restarting");
                attempt += 1;
            }
            Err(err) => {
                warn!(attempt, %err, "world graph generation failed");
                return Err(err);
            }
        }
    };
    graph.validate()?;

    let stats = graph.stats();
    debug!(
        attempt,
        nodes = stats.nodes,
        edges = stats.edges,
        paths = stats.paths,
        merged = stats.merged_nodes,
        "world graph generated"
    );
    Ok(graph)
}

/// One full search: broad pass from the start, then a targeted pass for
/// every final node the broad pass left without an incoming edge.
fn build_attempt(depth: u32, positions: &[Position], rng: &mut GameRng) -> Result<WorldGraph> {
    let mut ctx = SearchContext::new(depth, rng);
    let start = ctx.add_start(Position::ORIGIN)?;
    for &position in positions {
        ctx.add_final(position)?;
    }

    if !ctx.search(start)? {
        return Err(GraphError::Unsolvable {
            depth,
            final_nodes: ctx.final_nodes().len(),
        });
    }

    for final_node in ctx.open_final_nodes() {
        if ctx.connect_open_final(start, final_node)? {
            let key = ctx.nodes()[final_node.index()].key();
            trace!(%key, "open final node connected");
        }
    }

    let (nodes, final_nodes) = ctx.into_parts();
    if let Some(orphan) = final_nodes.iter().find(|idx| nodes[idx.index()].edges.is_empty()) {
        let key = nodes[orphan.index()].key();
        return Err(GraphError::OrphanFinalNode { key });
    }

    Ok(WorldGraph::new(nodes, start, final_nodes, depth))
}

impl WorldGraph {
    fn new(nodes: Vec<Node>, start: NodeIndex, final_nodes: Vec<NodeIndex>, depth: u32) -> Self {
        let by_position = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.position_key(), NodeIndex(i as u32)))
            .collect();
        let mut graph = Self {
            nodes,
            start,
            final_nodes,
            depth,
            debug_paths: Vec::new(),
            by_position,
        };
        graph.debug_paths = traversal::all_paths(&graph.nodes, start)
            .into_iter()
            .map(|path| path.into_iter().map(|idx| graph.nodes[idx.index()].key()).collect())
            .collect();
        graph
    }

    pub fn start(&self) -> NodeIndex {
        self.start
    }

    pub fn final_nodes(&self) -> &[NodeIndex] {
        &self.final_nodes
    }

    /// Depth of every final node
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Every start-to-final path as node keys
    pub fn debug_paths(&self) -> &[Vec<NodeKey>] {
        &self.debug_paths
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The room built on `position`, if any
    pub fn node_at(&self, position: Position) -> Option<NodeIndex> {
        self.by_position.get(&position.key()).copied()
    }

    pub fn is_final(&self, idx: NodeIndex) -> bool {
        self.final_nodes.contains(&idx)
    }

    /// Each edge once, as `(shallower, deeper, direction from shallower)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, Direction)> + '_ {
        (0..self.nodes.len() as u32).map(NodeIndex).flat_map(move |from| {
            traversal::neighbors(&self.nodes, from, Flow::Forward)
                .map(move |(dir, to)| (from, to, dir))
        })
    }

    pub fn bfs(&self) -> Bfs<'_> {
        Bfs::new(&self.nodes, self.start, Flow::Forward)
    }

    pub fn dfs(&self) -> Dfs<'_> {
        Dfs::new(&self.nodes, self.start, Flow::Forward)
    }

    pub fn bfs_from(&self, root: NodeIndex, flow: Flow) -> Bfs<'_> {
        Bfs::new(&self.nodes, root, flow)
    }

    pub fn dfs_from(&self, root: NodeIndex, flow: Flow) -> Dfs<'_> {
        Dfs::new(&self.nodes, root, flow)
    }

    /// Which walls of a room lead deeper and which lead back
    pub fn split_directions(&self, idx: NodeIndex) -> DirectionSplit {
        traversal::split_directions(&self.nodes, idx)
    }

    /// Re-check the structural invariants of the graph
    pub fn validate(&self) -> Result<()> {
        let starts = self.nodes.iter().filter(|node| node.depth == 1).count();
        let start = self.node(self.start);
        if starts != 1 || start.depth != 1 {
            return Err(GraphError::InvalidStart { found: starts });
        }

        let mut seen: HashMap<PositionKey, NodeKey> = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(existing) = seen.insert(node.position_key(), node.key()) {
                return Err(GraphError::PositionConflict {
                    key: node.key(),
                    existing,
                });
            }

            for (dir, to) in node.edges.iter() {
                let other = self.node(to);
                let reason = if other.position != node.position.step(dir) {
                    Some("endpoints are not neighbouring cells")
                } else if node.depth.abs_diff(other.depth) != 1 {
                    Some("depths must differ by exactly one")
                } else if other.neighbor(dir.opposite()) != Some(NodeIndex(i as u32)) {
                    Some("edge is not stored on both endpoints")
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(GraphError::InvalidEdge {
                        from: node.key(),
                        to: other.key(),
                        reason,
                    });
                }
            }
        }

        for &idx in &self.final_nodes {
            let node = self.node(idx);
            if node.depth != self.depth {
                return Err(GraphError::FinalDepthMismatch {
                    key: node.key(),
                    expected: self.depth,
                });
            }
            if traversal::neighbors(&self.nodes, idx, Flow::Backward).next().is_none() {
                return Err(GraphError::OrphanFinalNode { key: node.key() });
            }
        }

        let reachable = self.bfs().count();
        if reachable != self.nodes.len()
            && let Some(unreached) = self.unreached_node()
        {
            return Err(GraphError::UnreachableNode { key: unreached });
        }

        Ok(())
    }

    fn unreached_node(&self) -> Option<NodeKey> {
        let mut reached = vec![false; self.nodes.len()];
        for idx in self.bfs() {
            reached[idx.index()] = true;
        }
        reached
            .iter()
            .position(|&r| !r)
            .map(|i| self.nodes[i].key())
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.nodes.len(),
            final_nodes: self.final_nodes.len(),
            paths: self.debug_paths.len(),
            ..GraphStats::default()
        };
        for i in 0..self.nodes.len() {
            let idx = NodeIndex(i as u32);
            let next = traversal::neighbors(&self.nodes, idx, Flow::Forward).count();
            let previous = traversal::neighbors(&self.nodes, idx, Flow::Backward).count();
            stats.edges += next;
            stats.max_out_degree = stats.max_out_degree.max(next);
            if previous > 1 {
                stats.merged_nodes += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(depth: u32, count: u32, seed: &str) -> WorldGraph {
        let mut rng = GameRng::from_seed_str(seed);
        generate_world_graph(&WorldGraphOptions::new(depth, count), &mut rng).unwrap()
    }

    #[test]
    fn test_generated_graph_validates() {
        let graph = generate(6, 2, "validate");
        assert!(graph.validate().is_ok());
        assert_eq!(graph.node(graph.start()).position, Position::ORIGIN);
    }

    #[test]
    fn test_rejects_invalid_options() {
        let mut rng = GameRng::new(1);
        let err = generate_world_graph(&WorldGraphOptions::new(3, 1), &mut rng).unwrap_err();
        assert!(matches!(err, GraphError::InvalidDepth { .. }));
    }

    #[test]
    fn test_huge_final_node_count_is_an_error() {
        let mut rng = GameRng::new(1);
        let options = WorldGraphOptions::new(4, u32::MAX);
        let err = generate_world_graph(&options, &mut rng).unwrap_err();
        assert!(matches!(err, GraphError::TooManyFinalNodes { .. }));
    }

    #[test]
    fn test_crowded_final_nodes_fail() {
        // all four neighbours of the start are goals at depth 4
        let mut rng = GameRng::new(1);
        let err = generate_world_graph(&WorldGraphOptions::new(4, 4), &mut rng).unwrap_err();
        assert!(matches!(err, GraphError::Unsolvable { .. }));
    }

    #[test]
    fn test_partially_reachable_final_nodes_fail() {
        let mut rng = GameRng::new(1);
        let err = generate_world_graph(&WorldGraphOptions::new(4, 3), &mut rng).unwrap_err();
        assert!(matches!(err, GraphError::OrphanFinalNode { .. }));
    }

    #[test]
    fn test_goals_cut_off_by_broad_search_are_connected() {
        // configurations where the first search left a goal with no way in
        for (depth, count, seed) in [(23, 3, 5), (7, 5, 8), (7, 5, 18), (11, 6, 0)] {
            let mut rng = GameRng::new(seed);
            let options = WorldGraphOptions::new(depth, count);
            let graph = generate_world_graph(&options, &mut rng).unwrap();
            for &goal in graph.final_nodes() {
                assert!(!graph.node(goal).edges.is_empty());
            }
            assert!(graph.validate().is_ok());
        }
    }

    #[test]
    fn test_node_at_and_is_final() {
        let graph = generate(5, 4, "lookup");
        for &idx in graph.final_nodes() {
            assert!(graph.is_final(idx));
            assert_eq!(graph.node_at(graph.node(idx).position), Some(idx));
        }
        assert!(!graph.is_final(graph.start()));
        assert_eq!(graph.node_at(Position::new(50, 50)), None);
    }

    #[test]
    fn test_edges_listed_once() {
        let graph = generate(7, 3, "edges");
        let total_slots: usize = graph.nodes().iter().map(|n| n.edges.len()).sum();
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges.len() * 2, total_slots);
        for (from, to, dir) in edges {
            assert_eq!(graph.node(from).depth + 1, graph.node(to).depth);
            assert_eq!(graph.node(from).neighbor(dir), Some(to));
        }
    }

    #[test]
    fn test_stats() {
        let graph = generate(4, 1, "hello");
        let stats = graph.stats();
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.edges, 6);
        assert_eq!(stats.final_nodes, 1);
        assert_eq!(stats.paths, 2);
        assert_eq!(stats.max_out_degree, 2);
        assert_eq!(stats.merged_nodes, 1);
    }

    #[test]
    fn test_split_directions_on_start() {
        let graph = generate(4, 1, "hello");
        let split = graph.split_directions(graph.start());
        assert!(split.previous.is_empty());
        let mut next = split.next.clone();
        next.sort();
        assert_eq!(next, vec![Direction::North, Direction::South]);
    }
}
