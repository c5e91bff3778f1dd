//! Generation errors
//!
//! Every variant is a level-design misconfiguration or a broken graph
//! invariant. Only `Unsolvable` and `OrphanFinalNode` start a fresh search
//! attempt; every other variant stops generation at once.

use thiserror::Error;

use crate::graph::{Direction, NodeKey, PositionKey};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("depth must be at least {min}, got {depth}")]
    InvalidDepth { depth: u32, min: u32 },

    #[error("at least one final node is required, got {count}")]
    InvalidFinalNodeCount { count: u32 },

    #[error("two final nodes were placed on the same cell {position}")]
    CoincidentFinalNodes { position: PositionKey },

    #[error("{count} final nodes do not fit on a circle of {capacity} cells")]
    TooManyFinalNodes { count: u32, capacity: u64 },

    #[error("cell {} is already used by node {existing}, cannot add {key}", .key.position_key())]
    PositionConflict { key: NodeKey, existing: NodeKey },

    #[error("node {node} already has a {direction} neighbour")]
    EdgeSlotOccupied { node: NodeKey, direction: Direction },

    #[error("no path from the start reaches a final node (depth {depth}, {final_nodes} final nodes)")]
    Unsolvable { depth: u32, final_nodes: usize },

    #[error("final node {key} has no incoming edge")]
    OrphanFinalNode { key: NodeKey },

    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from: NodeKey,
        to: NodeKey,
        reason: &'static str,
    },

    #[error("final node {key} should be at depth {expected}")]
    FinalDepthMismatch { key: NodeKey, expected: u32 },

    #[error("node {key} cannot be reached from the start")]
    UnreachableNode { key: NodeKey },

    #[error("graph must have exactly one start node at depth 1, found {found}")]
    InvalidStart { found: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, GraphError>;
