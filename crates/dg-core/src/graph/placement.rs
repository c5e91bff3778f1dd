//! Final-node placement
//!
//! Goal rooms sit on a Manhattan circle around the start. Every path from
//! the start to a goal has exactly `depth - 1` unit steps, and each step
//! flips the parity of `x + y`, so the circle's radius must share the parity
//! of `depth - 1` or no path of the right length exists.

use hashbrown::HashSet;

use super::key::Position;
use crate::error::{GraphError, Result};

/// Manhattan radius of the circle the final nodes are placed on
pub fn final_node_radius(depth: u32) -> u32 {
    let mut radius = (depth / 3).max(1);

    if (depth - 1) % 2 == 0 && radius % 2 == 1 {
        radius += 1;
    }
    if (depth - 1) % 2 == 1 && radius % 2 == 0 {
        radius += 1;
    }

    radius
}

/// Place `count` final nodes evenly by angle around the origin.
///
/// The L1 budget is split between the axes per point so that every
/// position is exactly [`final_node_radius`] away from the start. Returns
/// [`GraphError::TooManyFinalNodes`] when the circle has fewer cells than
/// `count`, and [`GraphError::CoincidentFinalNodes`] when the angular split
/// still puts two points on one cell.
pub fn place_final_nodes(depth: u32, count: u32) -> Result<Vec<Position>> {
    let radius = final_node_radius(depth);
    // an L1 circle of radius r has 4r cells
    let capacity = 4 * u64::from(radius);
    if u64::from(count) > capacity {
        return Err(GraphError::TooManyFinalNodes { count, capacity });
    }
    let r = radius as f64;

    let mut seen = HashSet::with_capacity(count as usize);
    let mut positions = Vec::with_capacity(count as usize);

    for i in 0..count {
        let angle = core::f64::consts::TAU * i as f64 / count as f64;
        let (sin, cos) = angle.sin_cos();

        let dx = (r * cos / (cos.abs() + sin.abs())).round() as i32;
        let rest = radius as i32 - dx.abs();
        let dy = if sin >= 0.0 { rest } else { -rest };

        let position = Position::new(dx, dy);
        if !seen.insert(position) {
            return Err(GraphError::CoincidentFinalNodes {
                position: position.key(),
            });
        }
        positions.push(position);
    }

    Ok(positions)
}
