//! Backtracking path search
//!
//! Grows the graph depth-first from the start room. A branch is only
//! attached to its parent after it has been shown to reach a final node, so
//! the arena never holds a dead branch once the recursion unwinds.
//!
//! Three things keep the search small:
//! - candidates that cannot reach any final node within the remaining depth
//!   are pruned on Manhattan distance,
//! - failed `(position, depth)` pairs are remembered and never retried,
//! - a branch arriving on a cell already built at the same depth links to
//!   that node instead of building a copy.
//!
//! The broad search can claim every cell around a goal at the wrong depth.
//! [`SearchContext::connect_open_final`] then searches again for that goal
//! alone, and may grow new branches out of nodes that already exist.

use dg_rng::GameRng;
use hashbrown::{HashMap, HashSet};
use tracing::trace;

use super::direction::Direction;
use super::key::{NodeKey, Position, PositionKey};
use super::node::{Node, NodeIndex};
use super::traversal::{Dfs, Flow};
use crate::error::{GraphError, Result};

/// Which final nodes a search is trying to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    /// Any final node; existing nodes at the right depth count as reached
    Any,
    /// One final node that has no incoming edge yet
    Only(NodeIndex),
}

/// Mutable state threaded through the recursive search
#[derive(Debug)]
pub struct SearchContext<'r> {
    max_depth: u32,
    nodes: Vec<Node>,
    final_nodes: Vec<NodeIndex>,
    /// Committed nodes by cell; one node per cell across all depths
    by_position: HashMap<PositionKey, NodeIndex>,
    dead_ends: HashSet<NodeKey>,
    rng: &'r mut GameRng,
}

impl<'r> SearchContext<'r> {
    pub fn new(max_depth: u32, rng: &'r mut GameRng) -> Self {
        Self {
            max_depth,
            nodes: Vec::new(),
            final_nodes: Vec::new(),
            by_position: HashMap::new(),
            dead_ends: HashSet::new(),
            rng,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn final_nodes(&self) -> &[NodeIndex] {
        &self.final_nodes
    }

    pub fn node_at(&self, position: Position) -> Option<NodeIndex> {
        self.by_position.get(&position.key()).copied()
    }

    #[cfg(test)]
    fn is_dead_end(&self, key: &NodeKey) -> bool {
        self.dead_ends.contains(key)
    }

    /// Final nodes that nothing links into yet
    pub fn open_final_nodes(&self) -> Vec<NodeIndex> {
        self.final_nodes
            .iter()
            .copied()
            .filter(|&idx| self.is_open(idx))
            .collect()
    }

    /// Add and register the start room
    pub fn add_start(&mut self, position: Position) -> Result<NodeIndex> {
        let start = self.push(Node::new(position, 1));
        self.register(start)?;
        Ok(start)
    }

    /// Add and register a final node at the maximum depth
    pub fn add_final(&mut self, position: Position) -> Result<NodeIndex> {
        let node = self.push(Node::new(position, self.max_depth));
        self.register(node)?;
        self.final_nodes.push(node);
        Ok(node)
    }

    /// Hand the built arena back to the caller
    pub fn into_parts(self) -> (Vec<Node>, Vec<NodeIndex>) {
        (self.nodes, self.final_nodes)
    }

    /// Returns whether `source` reaches some final node, wiring every
    /// successful branch below it.
    pub fn search(&mut self, source: NodeIndex) -> Result<bool> {
        self.explore(source, Goal::Any)
    }

    /// Search from `start` for a path into the open final node `target`.
    ///
    /// Only `target` is used for pruning, and existing nodes on the way may
    /// be extended with new branches. Dead ends found here are kept apart
    /// from the broad search's. Returns whether `target` got an incoming edge.
    pub fn connect_open_final(&mut self, start: NodeIndex, target: NodeIndex) -> Result<bool> {
        if !self.is_open(target) {
            return Ok(true);
        }
        let broad_dead_ends = core::mem::take(&mut self.dead_ends);
        let result = self.explore(start, Goal::Only(target));
        self.dead_ends = broad_dead_ends;
        result?;
        Ok(!self.is_open(target))
    }

    fn explore(&mut self, source: NodeIndex, goal: Goal) -> Result<bool> {
        let mut directions = Direction::ALL;
        self.rng.shuffle(&mut directions);

        let source_position = self.nodes[source.index()].position;
        let depth = self.nodes[source.index()].depth + 1;
        let mut found = false;

        for dir in directions {
            if let Goal::Only(target) = goal
                && !self.is_open(target)
            {
                break;
            }

            let position = source_position.step(dir);
            let key = NodeKey::new(position, depth);

            if self.dead_ends.contains(&key) {
                continue;
            }

            if !self.can_reach_final(key, goal) {
                trace!(%key, "pruned, no final node within reach");
                self.dead_ends.insert(key);
                continue;
            }

            if let Some(existing) = self.node_at(position) {
                // a committed node already owns this cell
                if self.nodes[existing.index()].depth != depth {
                    continue;
                }
                match goal {
                    Goal::Only(target) if existing != target => {
                        if self.extend(source, dir, existing, goal)? {
                            found = true;
                        }
                    }
                    _ => {
                        trace!(%key, "merged into existing node");
                        self.connect(source, dir, existing)?;
                        found = true;
                    }
                }
                continue;
            }

            if self.has_ancestor_at(source, position) {
                continue;
            }

            let mark = self.nodes.len();
            let candidate = self.push(Node::new(position, depth));
            self.attach(candidate, dir.opposite(), source)?;

            if depth + 1 == self.max_depth
                && let Some(final_node) = self.open_final_next_to(position, goal)
            {
                let final_position = self.nodes[final_node.index()].position;
                if let Some(towards) = position.direction_to(final_position) {
                    self.connect(candidate, towards, final_node)?;
                    self.commit(source, dir, candidate)?;
                    found = true;
                    continue;
                }
            }

            if self.explore(candidate, goal)? {
                self.commit(source, dir, candidate)?;
                found = true;
            } else {
                // everything past `mark` belongs to the failed branch
                self.nodes.truncate(mark);
            }
        }

        if !found {
            let key = self.nodes[source.index()].key();
            trace!(%key, "dead end");
            self.dead_ends.insert(key);
        }

        Ok(found)
    }

    /// Grow new branches out of an existing node. The edge from `source` is
    /// linked first so the ancestor walk below `existing` sees the current
    /// path, and is removed again if nothing was found.
    fn extend(
        &mut self,
        source: NodeIndex,
        dir: Direction,
        existing: NodeIndex,
        goal: Goal,
    ) -> Result<bool> {
        let linked = self.nodes[source.index()].neighbor(dir) == Some(existing);
        if !linked {
            self.connect(source, dir, existing)?;
        }
        let found = self.explore(existing, goal)?;
        if !found && !linked {
            self.nodes[source.index()].edges.clear(dir);
            self.nodes[existing.index()].edges.clear(dir.opposite());
        }
        Ok(found)
    }

    fn is_open(&self, final_node: NodeIndex) -> bool {
        self.nodes[final_node.index()].edges.is_empty()
    }

    /// Whether a goal final node is within the depth budget left at `key`.
    /// A candidate that is itself such a final node always qualifies.
    fn can_reach_final(&self, key: NodeKey, goal: Goal) -> bool {
        let reachable = |idx: NodeIndex| {
            let final_node = &self.nodes[idx.index()];
            if final_node.key() == key {
                return true;
            }
            final_node.depth > key.depth
                && final_node.position.manhattan(key.position) <= final_node.depth - key.depth
        };
        match goal {
            Goal::Any => self.final_nodes.iter().any(|&idx| reachable(idx)),
            Goal::Only(target) => reachable(target),
        }
    }

    /// Strict ancestors of `source` (and `source` itself) occupying `position`
    fn has_ancestor_at(&self, source: NodeIndex, position: Position) -> bool {
        Dfs::new(&self.nodes, source, Flow::Backward)
            .any(|idx| self.nodes[idx.index()].position == position)
    }

    /// First goal final node one step from `position` with no incoming edge yet
    fn open_final_next_to(&self, position: Position, goal: Goal) -> Option<NodeIndex> {
        self.final_nodes.iter().copied().find(|&idx| {
            let in_goal = match goal {
                Goal::Any => true,
                Goal::Only(target) => idx == target,
            };
            in_goal
                && self.is_open(idx)
                && self.nodes[idx.index()].position.manhattan(position) == 1
        })
    }

    fn push(&mut self, node: Node) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        idx
    }

    fn register(&mut self, idx: NodeIndex) -> Result<()> {
        let node = &self.nodes[idx.index()];
        if let Some(existing) = self.by_position.get(&node.position_key()) {
            return Err(GraphError::PositionConflict {
                key: node.key(),
                existing: self.nodes[existing.index()].key(),
            });
        }
        self.by_position.insert(node.position_key(), idx);
        Ok(())
    }

    /// Set one side of an edge
    fn attach(&mut self, from: NodeIndex, dir: Direction, to: NodeIndex) -> Result<()> {
        let node = &mut self.nodes[from.index()];
        match node.edges.get(dir) {
            Some(existing) if existing != to => Err(GraphError::EdgeSlotOccupied {
                node: node.key(),
                direction: dir,
            }),
            _ => {
                node.edges.set(dir, to);
                Ok(())
            }
        }
    }

    /// Set both sides of an edge
    fn connect(&mut self, from: NodeIndex, dir: Direction, to: NodeIndex) -> Result<()> {
        self.attach(from, dir, to)?;
        self.attach(to, dir.opposite(), from)
    }

    /// Attach a proven branch to its parent and make its cell visible to
    /// later branches
    fn commit(&mut self, source: NodeIndex, dir: Direction, candidate: NodeIndex) -> Result<()> {
        self.attach(source, dir, candidate)?;
        self.register(candidate)
    }
}
