//! dg-core: dungeon graph generation
//!
//! Builds the room graph of a level: a start room, several goal rooms at a
//! fixed depth, and the doors between them. Room geometry, enemies and
//! rendering consume the graph elsewhere. Everything here is synchronous and
//! deterministic for a given [`dg_rng::GameRng`] seed.
//!
//! ```
//! use dg_core::{generate_world_graph, WorldGraphOptions};
//! use dg_rng::GameRng;
//!
//! let mut rng = GameRng::from_seed_str("hello");
//! let graph = generate_world_graph(&WorldGraphOptions::new(4, 1), &mut rng).unwrap();
//! assert_eq!(graph.debug_paths().len(), 2);
//! ```

pub mod error;
pub mod graph;
pub mod options;

pub use error::{GraphError, Result};
pub use graph::{
    generate_world_graph, Direction, DirectionSplit, Flow, GraphStats, Node, NodeIndex, NodeKey,
    Position, PositionKey, WorldGraph, MAX_ATTEMPTS,
};
pub use options::{WorldGraphOptions, MIN_DEPTH};
