//! Per-tick input state.
//!
//! The scene holds exactly one [`InputFrame`] per tick; behaviors read it
//! through [`TickCtx::input`](crate::scene::TickCtx::input). Feeding the
//! same sequence of frames to two scenes with the same seed produces
//! bit-identical runs, which is what makes input recordings replayable.

use serde::{Deserialize, Serialize};

/// The device-independent input sample for one tick.
///
/// Flags, not edges: a held key is `true` on every frame it is down.
/// Behaviors that need press/release edges compare against the frame they
/// kept from the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Directional: up (negative y).
    pub up: bool,
    /// Directional: down (positive y).
    pub down: bool,
    /// Directional: left (negative x).
    pub left: bool,
    /// Directional: right (positive x).
    pub right: bool,
    /// Primary action button.
    pub primary: bool,
    /// Secondary action button.
    pub secondary: bool,
}

impl InputFrame {
    /// Horizontal axis as `-1`, `0`, or `1`. Opposite keys cancel.
    #[inline]
    pub fn dx(&self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }

    /// Vertical axis as `-1`, `0`, or `1` (y grows downward). Opposite
    /// keys cancel.
    #[inline]
    pub fn dy(&self) -> i32 {
        i32::from(self.down) - i32::from(self.up)
    }

    /// Whether any directional flag is held.
    #[inline]
    pub fn any_direction(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
