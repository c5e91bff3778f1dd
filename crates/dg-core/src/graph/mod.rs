//! Dungeon graph
//!
//! Rooms on an integer grid linked by doors, generated so that every goal
//! room is reachable from the start at exactly the configured depth.

mod direction;
mod key;
mod node;
mod placement;
mod search;
mod traversal;
mod world;

pub use direction::{Direction, Edges};
pub use key::{NodeKey, Position, PositionKey};
pub use node::{Node, NodeIndex};
pub use placement::{final_node_radius, place_final_nodes};
pub use search::SearchContext;
pub use traversal::{all_paths, neighbors, split_directions, Bfs, Dfs, DirectionSplit, Flow};
pub use world::{generate_world_graph, GraphStats, WorldGraph, MAX_ATTEMPTS};
