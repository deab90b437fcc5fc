//! Gridcast Stage -- tile grid storage and grid-walking raycasts.
//!
//! The stage is the immutable-per-tick world the simulation moves through:
//! a 2D array of [`TileCode`](tile::TileCode)s with a closed-world boundary
//! (everything outside the grid reads as Solid), a lazily captured reference
//! snapshot for restoring deformed tiles, and the integer grid-walking
//! queries (wall search, tile search, line-of-sight) everything above it
//! uses for visibility and movement.
//!
//! # Quick Start
//!
//! ```
//! use gridcast_stage::prelude::*;
//!
//! let mut grid = TileGrid::new(8, 8, 32.0);
//! grid.set_tile(3, 3, TileCode::Solid);
//!
//! assert_eq!(grid.tile_at(3, 3), TileCode::Solid);
//! assert_eq!(grid.tile_at(-1, 0), TileCode::Solid); // closed world
//! assert!(!solid_space(&grid, 0, 0, 6, 6));         // wall on the line
//! ```

#![deny(unsafe_code)]

pub mod grid;
pub mod raycast;
pub mod tile;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while loading stage data.
///
/// Lookup past the grid edge is *not* an error -- it resolves to Solid by
/// design, so "falling off the map" and "shooting past the wall" are
/// well-defined without branching at every call site.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// A byte in the level data does not name a tile code.
    #[error("unknown tile code {code} at cell ({x}, {y})")]
    UnknownTileCode {
        /// The offending byte.
        code: u8,
        /// Cell x coordinate.
        x: i32,
        /// Cell y coordinate.
        y: i32,
    },

    /// The level byte matrix does not match the declared dimensions.
    #[error("level data length {actual} does not match {width}x{height} ({expected} cells)")]
    DimensionMismatch {
        /// Declared grid width in cells.
        width: i32,
        /// Declared grid height in cells.
        height: i32,
        /// Expected cell count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::grid::TileGrid;
    pub use crate::raycast::{find_edge_point, find_wall_point, search_tile, solid_space};
    pub use crate::tile::{TileCode, TileCodeSet};
    pub use crate::StageError;
}
