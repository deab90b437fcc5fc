//! Line-segment primitives.
//!
//! These back the higher-level visibility queries: the tile-grid raycaster
//! and "can this entity see that entity" checks reuse them, and turret or
//! guard behaviors call them directly for beam tests.

// ---------------------------------------------------------------------------
// Segment x segment
// ---------------------------------------------------------------------------

/// Whether the segments `a0..a1` and `b0..b1` intersect.
///
/// Parametric test: the intersection point of the two infinite lines is
/// computed as `a0 + t*(a1-a0) = b0 + u*(b1-b0)`, and the segments hit iff
/// both `t` and `u` lie in `[0, 1]`. Parallel and collinear segments report
/// no intersection.
pub fn segments_intersect(a0: (f32, f32), a1: (f32, f32), b0: (f32, f32), b1: (f32, f32)) -> bool {
    let r = (a1.0 - a0.0, a1.1 - a0.1);
    let s = (b1.0 - b0.0, b1.1 - b0.1);

    let denom = cross(r, s);
    if denom == 0.0 {
        return false;
    }

    let d = (b0.0 - a0.0, b0.1 - a0.1);
    let t = cross(d, s) / denom;
    let u = cross(d, r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

// ---------------------------------------------------------------------------
// Segment x circle
// ---------------------------------------------------------------------------

/// Whether the segment `a0..a1` passes through the circle.
///
/// Closest-point test: the circle center is projected onto the segment
/// (clamped to the endpoints) and the squared distance compared to the
/// squared radius. A zero-length segment degenerates to a point test.
pub fn segment_hits_circle(a0: (f32, f32), a1: (f32, f32), center: (f32, f32), radius: f32) -> bool {
    let d = (a1.0 - a0.0, a1.1 - a0.1);
    let len2 = d.0 * d.0 + d.1 * d.1;

    let (cx, cy) = if len2 == 0.0 {
        a0
    } else {
        let t = (((center.0 - a0.0) * d.0 + (center.1 - a0.1) * d.1) / len2).clamp(0.0, 1.0);
        (a0.0 + t * d.0, a0.1 + t * d.1)
    };

    let dx = center.0 - cx;
    let dy = center.1 - cy;
    dx * dx + dy * dy < radius * radius
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Unit direction from `a` toward `b`.
///
/// Coincident points return the zero vector rather than propagating
/// NaN through a division by zero length; every caller treats a zero
/// direction as "no movement / no aim".
pub fn direction_between(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        (0.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

#[inline]
fn cross(a: (f32, f32), b: (f32, f32)) -> f32 {
    a.0 * b.1 - a.1 * b.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
