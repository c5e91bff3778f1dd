//! Compass directions and the fixed four-slot edge set

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use super::node::NodeIndex;

/// One of the four axis-aligned steps between neighbouring rooms
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four directions in declaration order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Get the delta (dx, dy) for this direction. North is -y.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Direction corresponding to a unit step, if any
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Slot of this direction in an [`Edges`] array
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Per-node neighbour slots, one per compass direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges([Option<NodeIndex>; 4]);

impl Edges {
    pub fn get(&self, dir: Direction) -> Option<NodeIndex> {
        self.0[dir.index()]
    }

    pub fn set(&mut self, dir: Direction, node: NodeIndex) {
        self.0[dir.index()] = Some(node);
    }

    pub fn clear(&mut self, dir: Direction) {
        self.0[dir.index()] = None;
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    /// Occupied slots as `(direction, neighbour)` pairs, in direction order
    pub fn iter(&self) -> impl Iterator<Item = (Direction, NodeIndex)> + '_ {
        Direction::iter().filter_map(|dir| self.get(dir).map(|node| (dir, node)))
    }
}
