//! Graph nodes (rooms) and their arena indices

use serde::{Deserialize, Serialize};

use super::direction::{Direction, Edges};
use super::key::{NodeKey, Position, PositionKey};

/// Stable index of a node in the graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A room in the dungeon graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub position: Position,

    /// Distance from the start plus one; the start room has depth 1
    pub depth: u32,

    /// Neighbours by compass direction, stored on both endpoints
    pub edges: Edges,
}

impl Node {
    pub fn new(position: Position, depth: u32) -> Self {
        Self {
            position,
            depth,
            edges: Edges::default(),
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.position, self.depth)
    }

    pub fn position_key(&self) -> PositionKey {
        self.position.key()
    }

    pub fn neighbor(&self, dir: Direction) -> Option<NodeIndex> {
        self.edges.get(dir)
    }
}
