//! Entity handles and movable bodies.
//!
//! An [`EntityId`] is a 64-bit handle packing a *generation* counter in the
//! high 32 bits and a slot *index* in the low 32 bits. The generation is
//! bumped every time a slot is recycled, so a handle held across a discard
//! is detected as stale instead of silently aliasing the new occupant.
//!
//! A [`Body`] is everything the scheduler needs to simulate one entity:
//! its collision [`Shape`], previous-tick position, flags, draw depth, and
//! the per-tick tile occupancy set.

use std::fmt;

use serde::{Deserialize, Serialize};

use gridcast_geom::prelude::Shape;
use gridcast_stage::prelude::TileCodeSet;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational entity handle.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Construct a handle from a slot index and generation.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The slot index (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw `u64` representation, used in snapshots.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// The simulated state of one entity.
///
/// Position lives on `shape` (a center, in pixels). The scheduler records
/// the position at the start of each entity's step into `prev_x`/`prev_y`
/// before the behavior runs, so a behavior can always step back to where
/// the tick began.
#[derive(Debug, Clone)]
pub struct Body {
    /// Collision shape and current position.
    pub shape: Shape,
    /// Horizontal center at the start of this entity's current step.
    pub prev_x: f32,
    /// Vertical center at the start of this entity's current step.
    pub prev_y: f32,
    /// A frozen body fails every movement validation without moving.
    pub frozen: bool,
    /// Draw-list visibility. Invisible bodies still collide.
    pub visible: bool,
    /// Draw/update priority. Lower depth steps (and draws) first; ties
    /// keep spawn order.
    pub depth: i32,
    /// Handles of other entities this body treats as solid obstacles.
    pub solids: Vec<EntityId>,
    /// Non-Hollow tile codes the footprint overlapped after this entity's
    /// most recent step. Recomputed by the scheduler every tick.
    pub(crate) touching: TileCodeSet,
}

impl Body {
    /// A visible, unfrozen body at depth 0.
    pub fn new(shape: Shape) -> Self {
        let (x, y) = (shape.x, shape.y);
        Self {
            shape,
            prev_x: x,
            prev_y: y,
            frozen: false,
            visible: true,
            depth: 0,
            solids: Vec::new(),
            touching: TileCodeSet::EMPTY,
        }
    }

    /// Builder: set the draw/update depth.
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    /// Builder: start frozen.
    pub fn with_frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    /// Builder: set the solid-obstacle handles.
    pub fn with_solids(mut self, solids: Vec<EntityId>) -> Self {
        self.solids = solids;
        self
    }

    /// Current center position in pixels.
    #[inline]
    pub fn position(&self) -> (f32, f32) {
        (self.shape.x, self.shape.y)
    }

    /// Position at the start of this entity's current step.
    #[inline]
    pub fn prev_position(&self) -> (f32, f32) {
        (self.prev_x, self.prev_y)
    }

    /// Movement accumulated since the step began.
    #[inline]
    pub fn step_delta(&self) -> (f32, f32) {
        (self.shape.x - self.prev_x, self.shape.y - self.prev_y)
    }

    /// Undo all movement made during the current step.
    pub fn step_back(&mut self) {
        self.shape.x = self.prev_x;
        self.shape.y = self.prev_y;
    }

    /// Tile codes the footprint overlapped after the most recent step.
    #[inline]
    pub fn touching(&self) -> TileCodeSet {
        self.touching
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
