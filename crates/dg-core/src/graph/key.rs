//! Identity keys for grid cells and node instances
//!
//! A [`PositionKey`] names a grid cell regardless of depth and is what lets
//! two search branches land on the same room. A [`NodeKey`] adds the depth
//! and names one node instance; dead-end memoization is keyed by it.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// Integer grid coordinate of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `dir`
    pub const fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// L1 distance
    pub const fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction of the single axis-aligned step from `self` to `other`
    pub const fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::from_delta(other.x - self.x, other.y - self.y)
    }

    pub const fn key(self) -> PositionKey {
        PositionKey(self)
    }
}

/// Depth-independent identity of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey(pub Position);

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}

/// Identity of one node instance: a grid cell at a given depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub position: Position,
    pub depth: u32,
}

impl NodeKey {
    pub const fn new(position: Position, depth: u32) -> Self {
        Self { position, depth }
    }

    pub const fn position_key(&self) -> PositionKey {
        self.position.key()
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}@{}", self.position.x, self.position.y, self.depth)
    }
}
