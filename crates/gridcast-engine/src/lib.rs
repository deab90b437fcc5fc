//! Gridcast Engine -- movement validation and the fixed-tick entity scheduler.
//!
//! This crate ties the [`gridcast_geom`] predicates and the
//! [`gridcast_stage`] grid together into a simulation: a [`Scene`](scene::Scene)
//! owns the tile grid and the live entity set, applies deferred add/discard
//! requests exactly once per tick, keeps draw order stable, and for every
//! movable entity runs its behavior step, validates movement, classifies
//! tile occupancy, and dispatches the resulting callbacks.
//!
//! The whole tick runs to completion on one thread; determinism is a
//! first-class requirement (same per-tick inputs => bit-identical entity
//! positions), which is what the BLAKE3 [`state_hash`](scene::Scene::state_hash)
//! verifies.
//!
//! # Quick Start
//!
//! ```
//! use gridcast_engine::prelude::*;
//!
//! let grid = TileGrid::new(10, 10, 32.0);
//! let mut scene = Scene::new(grid, 42);
//!
//! let id = scene.spawn(Body::new(Shape::rect(80.0, 80.0, 24.0, 24.0)));
//! assert!(!scene.is_live(id)); // not live until the flush
//!
//! scene.tick();
//! assert!(scene.is_live(id));
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod input;
pub mod scene;
pub mod snapshot;
pub mod validator;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the geometry kernel for convenience.
pub use gridcast_geom;

/// Re-export the stage crate for convenience.
pub use gridcast_stage;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by registry operations.
///
/// Failure to move or to find a tile is never an error -- those are
/// ordinary boolean/optional results on the validator and raycaster.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The entity handle is stale (discarded, or never allocated).
    #[error("entity {entity} is stale (discarded or never allocated)")]
    StaleEntity {
        /// The offending handle.
        entity: entity::EntityId,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use crate::entity::{Body, EntityId};
    pub use crate::input::InputFrame;
    pub use crate::scene::{Behavior, Scene, TickCtx};
    pub use crate::snapshot::{EntityRecord, SceneSnapshot};
    pub use crate::validator::{
        can_occupy, classify_footprint, try_step, Direction,
    };
    pub use crate::EngineError;

    pub use gridcast_geom::prelude::*;
    pub use gridcast_stage::prelude::*;
}
