//! Scene snapshots and state hashing.
//!
//! A [`SceneSnapshot`] is the serializable record of everything that feeds
//! back into the simulation: tick count, tile bytes, the input frame, and
//! every live entity in update order. Hashing it with BLAKE3 gives a cheap
//! per-tick fingerprint for determinism checks: two runs with the same
//! seed and input sequence must produce the same hash on every tick, and
//! the first diverging tick localizes a nondeterminism bug.

use serde::{Deserialize, Serialize};

use crate::entity::{Body, EntityId};
use crate::input::InputFrame;

// ---------------------------------------------------------------------------
// EntityRecord
// ---------------------------------------------------------------------------

/// The snapshot form of one live entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Raw handle (index and generation).
    pub id: u64,
    /// Horizontal center, pixels.
    pub x: f32,
    /// Vertical center, pixels.
    pub y: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Uniform scale factor.
    pub scale: f32,
    /// Draw/update depth.
    pub depth: i32,
    /// Frozen flag.
    pub frozen: bool,
    /// Visibility flag.
    pub visible: bool,
    /// Tile occupancy bitmask after the most recent step.
    pub touching: u16,
}

impl EntityRecord {
    /// Record the snapshot-relevant fields of a body.
    pub fn capture(id: EntityId, body: &Body) -> Self {
        Self {
            id: id.to_raw(),
            x: body.shape.x,
            y: body.shape.y,
            rotation: body.shape.rotation,
            scale: body.shape.scale,
            depth: body.depth,
            frozen: body.frozen,
            visible: body.visible,
            touching: body.touching().bits(),
        }
    }

    /// The recorded handle.
    pub fn entity(&self) -> EntityId {
        EntityId::from_raw(self.id)
    }
}

// ---------------------------------------------------------------------------
// SceneSnapshot
// ---------------------------------------------------------------------------

/// The serializable state of a scene at a tick boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Completed tick count.
    pub tick: u64,
    /// Grid width in cells.
    pub grid_width: i32,
    /// Grid height in cells.
    pub grid_height: i32,
    /// Row-major tile bytes, including any deformation.
    pub tiles: Vec<u8>,
    /// The input frame the next tick will see.
    pub input: InputFrame,
    /// Live entities in update order.
    pub entities: Vec<EntityRecord>,
}

impl SceneSnapshot {
    /// BLAKE3 hex digest of the canonical JSON serialization.
    pub fn state_hash(&self) -> String {
        let bytes = serde_json::to_vec(self)
            .expect("SceneSnapshot state should always be JSON-serializable");
        blake3::hash(&bytes).to_hex().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
