//! Gridcast Geometry Kernel -- stateless 2D collision predicates.
//!
//! This crate provides the pairwise collision tests the rest of the engine
//! is built on: axis-aligned and rotated rectangles, circles, pixel-exact
//! masks, and the line-segment primitives used by visibility queries. All
//! predicates are pure functions over two [`Shape`](shape::Shape)
//! descriptors; the crate holds no state and performs no allocation on the
//! hot path.
//!
//! # Quick Start
//!
//! ```
//! use gridcast_geom::prelude::*;
//!
//! let a = Shape::rect(0.0, 0.0, 10.0, 10.0);
//! let b = Shape::rect(5.0, 5.0, 10.0, 10.0);
//! assert!(collides(&a, &b));
//!
//! let c = Shape::circle(40.0, 0.0, 10.0);
//! assert!(!collides(&a, &c));
//! ```

#![deny(unsafe_code)]

pub mod collide;
pub mod segment;
pub mod shape;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building geometry resources.
///
/// Runtime collision queries never return errors -- failure to collide is an
/// ordinary `false`. Caller contract violations (pixel-exact collision with
/// rotation on both operands) panic instead; see [`collide::collides`].
#[derive(Debug, thiserror::Error)]
pub enum GeomError {
    /// The pixel buffer handed to [`PixelMask::from_alpha`](shape::PixelMask::from_alpha)
    /// does not match the declared dimensions.
    #[error("pixel mask buffer length {actual} does not match {width}x{height} RGBA ({expected} bytes)")]
    MaskDimensionMismatch {
        /// Declared mask width in pixels.
        width: u32,
        /// Declared mask height in pixels.
        height: u32,
        /// Expected buffer length in bytes.
        expected: usize,
        /// Actual buffer length in bytes.
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::collide::collides;
    pub use crate::segment::{direction_between, segment_hits_circle, segments_intersect};
    pub use crate::shape::{HitboxKind, PixelMask, Shape};
    pub use crate::GeomError;
}
