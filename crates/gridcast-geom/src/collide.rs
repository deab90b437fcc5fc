//! Pairwise collision dispatch.
//!
//! [`collides`] selects a predicate from the pair of [`HitboxKind`]s, in
//! order of precedence:
//!
//! 1. Either shape `Unhittable` -- always false.
//! 2. `PixelMask` x anything -- bounding-box pre-reject, then pixel
//!    sampling of the intersection rectangle.
//! 3. `Rectangle` x `Rectangle` -- axis-aligned interval overlap when both
//!    rotations are zero or *either* shape is flagged fast, exact
//!    separating-axis test otherwise.
//! 4. `Rectangle` x `Circle` -- closed-form circle-vs-AABB when the
//!    rectangle is unrotated, rotated-rectangle fall-back otherwise.
//! 5. `Circle` x `Circle` -- squared center distance vs squared radii sum.
//!
//! The enum-pair `match` keeps every combination exhaustively checked by
//! the compiler; there is no virtual dispatch.

use tracing::debug;

use crate::shape::{HitboxKind, Shape};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Whether two shapes overlap.
///
/// Symmetric: `collides(a, b) == collides(b, a)` for every shape pair.
///
/// # Panics
///
/// Panics if a pixel-exact test is requested while **both** operands carry a
/// non-zero rotation. That is a caller contract violation -- rotation must
/// be disabled before asking for pixel-exact collision -- not a runtime
/// condition to recover from.
pub fn collides(a: &Shape, b: &Shape) -> bool {
    use HitboxKind::*;
    match (a.kind, b.kind) {
        (Unhittable, _) | (_, Unhittable) => false,
        (PixelMask, _) => mask_overlap(a, b),
        (_, PixelMask) => mask_overlap(b, a),
        (Rectangle, Rectangle) => rect_rect(a, b),
        (Rectangle, Circle) => rect_circle(a, b),
        (Circle, Rectangle) => rect_circle(b, a),
        (Circle, Circle) => circle_circle(a, b),
    }
}

// ---------------------------------------------------------------------------
// Rectangle x Rectangle
// ---------------------------------------------------------------------------

fn rect_rect(a: &Shape, b: &Shape) -> bool {
    // One fast shape is enough to force the axis-aligned path for the whole
    // pair; the flag exists to override the counterpart's rotation too.
    if a.fast || b.fast || (a.rotation == 0.0 && b.rotation == 0.0) {
        aabb_overlap(a, b)
    } else {
        // Exact separating-axis test: check both rectangles' local axes.
        no_separation_on_axes_of(a, b) && no_separation_on_axes_of(b, a)
    }
}

/// Axis-aligned interval overlap on x and y.
#[inline]
fn aabb_overlap(a: &Shape, b: &Shape) -> bool {
    let (aw, ah) = a.half_extents();
    let (bw, bh) = b.half_extents();
    (a.x - b.x).abs() < aw + bw && (a.y - b.y).abs() < ah + bh
}

/// Separating-axis check restricted to `a`'s two local axes.
///
/// Transforms `b` into `a`'s local frame and projects `b`'s half-extents
/// onto `a`'s axes. Returns `false` if the projected interval lies entirely
/// outside `a`'s half-extent on either axis.
fn no_separation_on_axes_of(a: &Shape, b: &Shape) -> bool {
    let (sin_a, cos_a) = a.rotation.to_radians().sin_cos();

    // Center delta rotated into a's local frame.
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let local_dx = dx * cos_a + dy * sin_a;
    let local_dy = -dx * sin_a + dy * cos_a;

    // b's half-extents projected onto a's axes.
    let (sin_r, cos_r) = (b.rotation - a.rotation).to_radians().sin_cos();
    let (bw, bh) = b.half_extents();
    let proj_x = bw * cos_r.abs() + bh * sin_r.abs();
    let proj_y = bw * sin_r.abs() + bh * cos_r.abs();

    let (aw, ah) = a.half_extents();
    local_dx.abs() < aw + proj_x && local_dy.abs() < ah + proj_y
}

// ---------------------------------------------------------------------------
// Rectangle x Circle
// ---------------------------------------------------------------------------

fn rect_circle(rect: &Shape, circle: &Shape) -> bool {
    if rect.is_axis_aligned() {
        // Closed form: clamp the circle center to the rectangle bounds and
        // compare squared distance to squared radius.
        let (left, top, right, bottom) = rect.aabb();
        let cx = circle.x.clamp(left, right);
        let cy = circle.y.clamp(top, bottom);
        let dx = circle.x - cx;
        let dy = circle.y - cy;
        let r = circle.radius();
        dx * dx + dy * dy < r * r
    } else {
        // Approximation: inflate the circle into an unrotated square of the
        // same diameter and run the rotated-rectangle test. Not exact near
        // the rectangle's corners; kept for parity with the axis-aligned
        // footprint the rest of the engine samples.
        let square = Shape::rect(circle.x, circle.y, circle.eff_width(), circle.eff_width());
        rect_rect(rect, &square)
    }
}

// ---------------------------------------------------------------------------
// Circle x Circle
// ---------------------------------------------------------------------------

fn circle_circle(a: &Shape, b: &Shape) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let reach = a.radius() + b.radius();
    dx * dx + dy * dy < reach * reach
}

// ---------------------------------------------------------------------------
// PixelMask x anything
// ---------------------------------------------------------------------------

/// Pixel-exact overlap. `a` is the PixelMask-kind shape.
///
/// The cheap rectangle bounding test runs first; only if the bounds overlap
/// is the intersection rectangle sampled at integer coordinates, returning
/// true on the first pair of opaque pixels found in both shapes. A shape
/// without mask data never collides under this predicate. Sampling is
/// axis-aligned; a single rotated counterpart only affects the pre-reject.
fn mask_overlap(a: &Shape, b: &Shape) -> bool {
    // A fast operand collides as if unrotated, so it cannot violate the
    // one-rotation contract.
    assert!(
        a.is_axis_aligned() || b.is_axis_aligned(),
        "pixel-exact collision does not support rotation on both shapes \
         (rotations {} and {})",
        a.rotation,
        b.rotation
    );

    if a.mask.is_none() {
        debug!(kind = ?a.kind, "pixel-exact collision requested without mask data; treating as never colliding");
        return false;
    }
    if b.kind == HitboxKind::PixelMask && b.mask.is_none() {
        debug!(kind = ?b.kind, "pixel-exact collision requested without mask data; treating as never colliding");
        return false;
    }

    if !rect_rect(a, b) {
        return false;
    }

    // Integer intersection of the two axis-aligned footprints.
    let (a_left, a_top, a_right, a_bottom) = a.aabb();
    let (b_left, b_top, b_right, b_bottom) = b.aabb();
    let left = a_left.max(b_left).floor() as i32;
    let top = a_top.max(b_top).floor() as i32;
    let right = a_right.min(b_right).ceil() as i32;
    let bottom = a_bottom.min(b_bottom).ceil() as i32;

    for py in top..bottom {
        for px in left..right {
            if opaque_at_world(a, px, py) && opaque_at_world(b, px, py) {
                return true;
            }
        }
    }
    false
}

/// Whether the shape is opaque at the given world-space pixel.
///
/// Masked shapes sample the mask in local coordinates (scale-corrected);
/// maskless shapes are fully opaque over their bounding box.
#[inline]
fn opaque_at_world(shape: &Shape, px: i32, py: i32) -> bool {
    match &shape.mask {
        Some(mask) => {
            let (left, top, _, _) = shape.aabb();
            let mx = ((px as f32 - left) / shape.scale).floor() as i32;
            let my = ((py as f32 - top) / shape.scale).floor() as i32;
            mask.opaque_at(mx, my)
        }
        None => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
