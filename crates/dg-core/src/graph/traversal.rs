//! Traversals over the generated graph
//!
//! Every traversal is a fresh iterator over a node arena. A visited set makes
//! converging branches yield their shared node once.

use std::collections::VecDeque;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::node::{Node, NodeIndex};

/// Which way edges are followed relative to depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Towards depth + 1
    Forward,
    /// Towards depth - 1
    Backward,
}

impl Flow {
    fn follows(self, from: &Node, to: &Node) -> bool {
        match self {
            Flow::Forward => to.depth == from.depth + 1,
            Flow::Backward => to.depth + 1 == from.depth,
        }
    }
}

/// Neighbours of `node` in the given flow, in direction order
pub fn neighbors(
    nodes: &[Node],
    node: NodeIndex,
    flow: Flow,
) -> impl Iterator<Item = (Direction, NodeIndex)> + '_ {
    let from = &nodes[node.index()];
    from.edges
        .iter()
        .filter(move |(_, to)| flow.follows(from, &nodes[to.index()]))
}

/// Doors of a room, split by whether they lead deeper or back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionSplit {
    pub next: Vec<Direction>,
    pub previous: Vec<Direction>,
}

impl DirectionSplit {
    /// True if the wall facing `dir` needs a door
    pub fn has_door(&self, dir: Direction) -> bool {
        self.next.contains(&dir) || self.previous.contains(&dir)
    }
}

pub fn split_directions(nodes: &[Node], node: NodeIndex) -> DirectionSplit {
    DirectionSplit {
        next: neighbors(nodes, node, Flow::Forward).map(|(dir, _)| dir).collect(),
        previous: neighbors(nodes, node, Flow::Backward).map(|(dir, _)| dir).collect(),
    }
}

/// Breadth-first walk from a root
#[derive(Debug)]
pub struct Bfs<'g> {
    nodes: &'g [Node],
    flow: Flow,
    queue: VecDeque<NodeIndex>,
    visited: HashSet<NodeIndex>,
}

impl<'g> Bfs<'g> {
    pub fn new(nodes: &'g [Node], root: NodeIndex, flow: Flow) -> Self {
        let mut visited = HashSet::new();
        visited.insert(root);
        Self {
            nodes,
            flow,
            queue: VecDeque::from([root]),
            visited,
        }
    }
}

impl Iterator for Bfs<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.queue.pop_front()?;
        for (_, next) in neighbors(self.nodes, current, self.flow) {
            if self.visited.insert(next) {
                self.queue.push_back(next);
            }
        }
        Some(current)
    }
}

/// Depth-first (pre-order) walk from a root
#[derive(Debug)]
pub struct Dfs<'g> {
    nodes: &'g [Node],
    flow: Flow,
    stack: Vec<NodeIndex>,
    visited: HashSet<NodeIndex>,
}

impl<'g> Dfs<'g> {
    pub fn new(nodes: &'g [Node], root: NodeIndex, flow: Flow) -> Self {
        Self {
            nodes,
            flow,
            stack: vec![root],
            visited: HashSet::new(),
        }
    }
}

impl Iterator for Dfs<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        while let Some(current) = self.stack.pop() {
            if !self.visited.insert(current) {
                continue;
            }
            // reversed so the first direction is explored first
            let children: Vec<_> = neighbors(self.nodes, current, self.flow)
                .map(|(_, next)| next)
                .filter(|next| !self.visited.contains(next))
                .collect();
            self.stack.extend(children.into_iter().rev());
            return Some(current);
        }
        None
    }
}

/// Every root-to-leaf path following forward edges.
///
/// The count grows combinatorially with convergence; use it for diagnostics
/// and tests only.
pub fn all_paths(nodes: &[Node], root: NodeIndex) -> Vec<Vec<NodeIndex>> {
    fn walk(
        nodes: &[Node],
        node: NodeIndex,
        path: &mut Vec<NodeIndex>,
        out: &mut Vec<Vec<NodeIndex>>,
    ) {
        path.push(node);
        let mut is_leaf = true;
        for (_, next) in neighbors(nodes, node, Flow::Forward) {
            is_leaf = false;
            walk(nodes, next, path, out);
        }
        if is_leaf {
            out.push(path.clone());
        }
        path.pop();
    }

    let mut out = Vec::new();
    walk(nodes, root, &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::key::Position;

    /// Diamond: 0 -> {1, 2} -> 3
    ///
    /// ```text
    /// 0 1
    /// 2 3
    /// ```
    fn diamond() -> Vec<Node> {
        let mut nodes = vec![
            Node::new(Position::new(0, 0), 1),
            Node::new(Position::new(1, 0), 2),
            Node::new(Position::new(0, 1), 2),
            Node::new(Position::new(1, 1), 3),
        ];
        let link = |nodes: &mut Vec<Node>, a: u32, dir: Direction, b: u32| {
            nodes[a as usize].edges.set(dir, NodeIndex(b));
            nodes[b as usize].edges.set(dir.opposite(), NodeIndex(a));
        };
        link(&mut nodes, 0, Direction::East, 1);
        link(&mut nodes, 0, Direction::South, 2);
        link(&mut nodes, 1, Direction::South, 3);
        link(&mut nodes, 2, Direction::East, 3);
        nodes
    }

    #[test]
    fn test_bfs_visits_converged_node_once() {
        let nodes = diamond();
        let order: Vec<_> = Bfs::new(&nodes, NodeIndex(0), Flow::Forward).collect();
        assert_eq!(
            order,
            vec![NodeIndex(0), NodeIndex(2), NodeIndex(1), NodeIndex(3)]
        );
    }

    #[test]
    fn test_dfs_visits_converged_node_once() {
        let nodes = diamond();
        let order: Vec<_> = Dfs::new(&nodes, NodeIndex(0), Flow::Forward).collect();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], NodeIndex(0));
        let unique: HashSet<_> = order.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_backward_walk_reaches_root() {
        let nodes = diamond();
        let back: Vec<_> = Bfs::new(&nodes, NodeIndex(3), Flow::Backward).collect();
        assert_eq!(back.len(), 4);
        assert_eq!(back.last(), Some(&NodeIndex(0)));

        let from_mid: Vec<_> = Dfs::new(&nodes, NodeIndex(1), Flow::Backward).collect();
        assert_eq!(from_mid, vec![NodeIndex(1), NodeIndex(0)]);
    }

    #[test]
    fn test_traversal_restarts() {
        let nodes = diamond();
        let first: Vec<_> = Bfs::new(&nodes, NodeIndex(0), Flow::Forward).collect();
        let second: Vec<_> = Bfs::new(&nodes, NodeIndex(0), Flow::Forward).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_directions() {
        let nodes = diamond();
        let split = split_directions(&nodes, NodeIndex(1));
        assert_eq!(split.next, vec![Direction::South]);
        assert_eq!(split.previous, vec![Direction::West]);
        assert!(split.has_door(Direction::South));
        assert!(!split.has_door(Direction::North));

        let root = split_directions(&nodes, NodeIndex(0));
        assert!(root.previous.is_empty());
        assert_eq!(root.next, vec![Direction::South, Direction::East]);
    }

    #[test]
    fn test_all_paths() {
        let nodes = diamond();
        let paths = all_paths(&nodes, NodeIndex(0));
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert_eq!(path.len(), 3);
            assert_eq!(path[0], NodeIndex(0));
            assert_eq!(path[2], NodeIndex(3));
        }
    }
}
