//! Shape descriptors and pixel masks.
//!
//! A [`Shape`] is the minimal geometric description of anything that can
//! collide: a center position, nominal size, scale factor, rotation in
//! degrees, and a [`HitboxKind`] selecting which predicate applies.
//! Effective width/height is always `nominal * scale`.
//!
//! Positions are **centers**, not corners. Rotation is counter-clockwise
//! around the center.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::GeomError;

// ---------------------------------------------------------------------------
// HitboxKind
// ---------------------------------------------------------------------------

/// The tag selecting which collision predicate applies to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitboxKind {
    /// Axis-aligned or rotated rectangle.
    Rectangle,
    /// Circle. The effective bounding box must be square for the circle
    /// predicates to be meaningful.
    Circle,
    /// Pixel-exact collision against a precomputed opacity mask.
    /// A shape of this kind with no attached mask never collides.
    PixelMask,
    /// Never collides with anything.
    Unhittable,
}

// ---------------------------------------------------------------------------
// PixelMask
// ---------------------------------------------------------------------------

/// A precomputed opacity bitmask for pixel-exact collision.
///
/// Built once at load time from an image's alpha channel: a pixel is opaque
/// iff its alpha value is non-zero. Stored as a packed bitset, one bit per
/// pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    bits: Vec<u64>,
}

impl PixelMask {
    /// Build a mask from raw RGBA bytes (`4 * width * height` bytes).
    ///
    /// A pixel is recorded as opaque iff its alpha byte is non-zero.
    pub fn from_alpha(width: u32, height: u32, rgba: &[u8]) -> Result<Self, GeomError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(GeomError::MaskDimensionMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        let mut mask = Self::empty(width, height);
        for (i, px) in rgba.chunks_exact(4).enumerate() {
            if px[3] != 0 {
                mask.bits[i / 64] |= 1u64 << (i % 64);
            }
        }
        Ok(mask)
    }

    /// Build a mask directly from a per-pixel opacity function.
    /// Intended for tests and procedurally generated masks.
    pub fn from_fn(width: u32, height: u32, mut opaque: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::empty(width, height);
        for y in 0..height {
            for x in 0..width {
                if opaque(x, y) {
                    let i = (y * width + x) as usize;
                    mask.bits[i / 64] |= 1u64 << (i % 64);
                }
            }
        }
        mask
    }

    fn empty(width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            bits: vec![0u64; pixels.div_ceil(64)],
        }
    }

    /// Mask width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at `(x, y)` is opaque. Out-of-range coordinates
    /// are transparent.
    #[inline]
    pub fn opaque_at(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        let i = (y as u32 * self.width + x as u32) as usize;
        self.bits[i / 64] & (1u64 << (i % 64)) != 0
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// The minimal geometric description of anything that can collide.
///
/// The `fast` flag forces rotation-agnostic, axis-aligned collision even
/// when `rotation != 0`, trading accuracy for speed on the hot pairwise
/// path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// Horizontal center coordinate, in pixels.
    pub x: f32,
    /// Vertical center coordinate, in pixels.
    pub y: f32,
    /// Nominal width before scaling.
    pub width: f32,
    /// Nominal height before scaling.
    pub height: f32,
    /// Uniform scale factor. Effective size is `nominal * scale`.
    pub scale: f32,
    /// Rotation in degrees, counter-clockwise around the center.
    pub rotation: f32,
    /// Force the axis-aligned fast path regardless of rotation.
    pub fast: bool,
    /// Which collision predicate applies.
    pub kind: HitboxKind,
    /// Opacity mask for [`HitboxKind::PixelMask`] shapes. Absent masks
    /// degrade to never colliding under the pixel predicate.
    #[serde(skip)]
    pub mask: Option<Arc<PixelMask>>,
}

impl Shape {
    /// An axis-aligned rectangle centered at `(x, y)`.
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            scale: 1.0,
            rotation: 0.0,
            fast: false,
            kind: HitboxKind::Rectangle,
            mask: None,
        }
    }

    /// A circle centered at `(x, y)` with the given diameter.
    pub fn circle(x: f32, y: f32, diameter: f32) -> Self {
        Self {
            kind: HitboxKind::Circle,
            ..Self::rect(x, y, diameter, diameter)
        }
    }

    /// A pixel-exact shape whose footprint is the mask's dimensions.
    pub fn masked(x: f32, y: f32, mask: Arc<PixelMask>) -> Self {
        Self {
            kind: HitboxKind::PixelMask,
            mask: Some(Arc::clone(&mask)),
            ..Self::rect(x, y, mask.width() as f32, mask.height() as f32)
        }
    }

    /// A shape that never collides with anything.
    pub fn unhittable(x: f32, y: f32) -> Self {
        Self {
            kind: HitboxKind::Unhittable,
            ..Self::rect(x, y, 0.0, 0.0)
        }
    }

    /// Builder: set the rotation in degrees.
    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Builder: set the scale factor.
    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: enable the axis-aligned fast path.
    pub fn fast(mut self) -> Self {
        self.fast = true;
        self
    }

    // -- derived geometry ---------------------------------------------------

    /// Effective width (`nominal * scale`).
    #[inline]
    pub fn eff_width(&self) -> f32 {
        self.width * self.scale
    }

    /// Effective height (`nominal * scale`).
    #[inline]
    pub fn eff_height(&self) -> f32 {
        self.height * self.scale
    }

    /// Half-extents of the effective, unrotated bounding box.
    #[inline]
    pub fn half_extents(&self) -> (f32, f32) {
        (self.eff_width() * 0.5, self.eff_height() * 0.5)
    }

    /// Circle radius: half the effective width.
    ///
    /// Only meaningful for [`HitboxKind::Circle`] shapes with a square
    /// effective bounding box; a non-square circle is a caller contract
    /// violation.
    #[inline]
    pub fn radius(&self) -> f32 {
        debug_assert!(
            (self.eff_width() - self.eff_height()).abs() < 1e-4,
            "circle shape must have a square bounding box ({} x {})",
            self.eff_width(),
            self.eff_height()
        );
        self.eff_width() * 0.5
    }

    /// Axis-aligned bounding box as `(left, top, right, bottom)`, ignoring
    /// rotation.
    #[inline]
    pub fn aabb(&self) -> (f32, f32, f32, f32) {
        let (hw, hh) = self.half_extents();
        (self.x - hw, self.y - hh, self.x + hw, self.y + hh)
    }

    /// Whether collision against this shape may take the axis-aligned fast
    /// path: rotation is zero or the fast flag is set.
    #[inline]
    pub fn is_axis_aligned(&self) -> bool {
        self.rotation == 0.0 || self.fast
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
