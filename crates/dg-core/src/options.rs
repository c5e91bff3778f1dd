//! Generation options
//!
//! Level designers keep these alongside the level list; they are loaded from
//! JSON and validated before any generation work starts.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Smallest depth the final-node placement supports
pub const MIN_DEPTH: u32 = 4;

/// Shape of the dungeon graph to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldGraphOptions {
    /// Depth of every final node; the start room has depth 1
    pub depth: u32,

    /// Number of goal rooms placed around the start
    pub final_nodes_count: u32,
}

impl Default for WorldGraphOptions {
    fn default() -> Self {
        Self {
            depth: 6,
            final_nodes_count: 2,
        }
    }
}

impl WorldGraphOptions {
    pub const fn new(depth: u32, final_nodes_count: u32) -> Self {
        Self {
            depth,
            final_nodes_count,
        }
    }

    /// Check the ranges the generator relies on
    pub fn validate(&self) -> Result<()> {
        if self.depth < MIN_DEPTH {
            return Err(GraphError::InvalidDepth {
                depth: self.depth,
                min: MIN_DEPTH,
            });
        }
        if self.final_nodes_count == 0 {
            return Err(GraphError::InvalidFinalNodeCount {
                count: self.final_nodes_count,
            });
        }
        Ok(())
    }

    /// Parse options from JSON (e.g. `{"depth": 7, "finalNodesCount": 3}`)
    /// and validate them. Missing fields take their default.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}
