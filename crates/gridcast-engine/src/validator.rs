//! Movement validation against the tile grid and solid entities.
//!
//! Everything here is a pure function over a candidate position: the scene
//! resolves an entity's solid-obstacle handles to shapes and passes them in,
//! so validation never needs mutable access to the world. A move is legal
//! when the footprint stays inside the stage, overlaps no Solid tile, and
//! collides with no solid entity.
//!
//! Footprints are half-open on the right and bottom: a body flush against
//! a wall touches it without occupying it, so sliding along a wall is not
//! blocked by the wall itself.

use gridcast_geom::collide::collides;
use gridcast_geom::prelude::Shape;
use gridcast_stage::prelude::{TileCode, TileCodeSet, TileGrid};

use crate::entity::Body;

/// Nudge applied to the right/bottom footprint edge before cell mapping,
/// making the footprint half-open. Well below one pixel, far above f32
/// noise at stage scale.
const EDGE_EPS: f32 = 1e-3;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// An axis-aligned movement direction. The y axis grows downward, matching
/// screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Negative y.
    Up,
    /// Positive y.
    Down,
    /// Negative x.
    Left,
    /// Positive x.
    Right,
}

impl Direction {
    /// Unit pixel delta for one step in this direction.
    #[inline]
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Footprint classification
// ---------------------------------------------------------------------------

/// The set of non-Hollow tile codes the shape's rectangular footprint
/// overlaps.
///
/// Samples the perimeter of the axis-aligned bounding box in cell space:
/// both boundary rows and both boundary columns, every cell along each
/// (not just the corners, which would miss a thin wall crossing the middle
/// of an edge on bodies wider than one tile). Interior cells are not
/// sampled; footprints are assumed to span at most two tiles per axis.
pub fn classify_footprint(shape: &Shape, grid: &TileGrid) -> TileCodeSet {
    let (left, top, right, bottom) = shape.aabb();
    let ts = grid.tile_size();

    let cx0 = (left / ts).floor() as i32;
    let cy0 = (top / ts).floor() as i32;
    let cx1 = (((right - EDGE_EPS).max(left)) / ts).floor() as i32;
    let cy1 = (((bottom - EDGE_EPS).max(top)) / ts).floor() as i32;

    let mut set = TileCodeSet::EMPTY;
    let mut sample = |x: i32, y: i32| {
        let code = grid.tile_at(x, y);
        if code != TileCode::Hollow {
            set.insert(code);
        }
    };
    for cx in cx0..=cx1 {
        sample(cx, cy0);
        sample(cx, cy1);
    }
    for cy in cy0..=cy1 {
        sample(cx0, cy);
        sample(cx1, cy);
    }
    set
}

// ---------------------------------------------------------------------------
// Position validation
// ---------------------------------------------------------------------------

/// Whether `body` may occupy center position `(x, y)`.
///
/// Fails when the body is frozen, when the footprint would leave the stage
/// rectangle, when it would overlap a Solid tile, or when the relocated
/// shape collides with any shape in `solid_shapes`. The body itself is
/// never mutated; the candidate shape is a copy.
pub fn can_occupy(
    body: &Body,
    x: f32,
    y: f32,
    grid: &TileGrid,
    solid_shapes: &[&Shape],
) -> bool {
    if body.frozen {
        return false;
    }

    let mut candidate = body.shape.clone();
    candidate.x = x;
    candidate.y = y;

    let (left, top, right, bottom) = candidate.aabb();
    if left < 0.0 || top < 0.0 || right > grid.pixel_width() || bottom > grid.pixel_height() {
        return false;
    }

    if classify_footprint(&candidate, grid).contains(TileCode::Solid) {
        return false;
    }

    solid_shapes.iter().all(|s| !collides(&candidate, s))
}

/// Whether `body` could move `steps` pixels in `dir`.
///
/// Checks the destination only; [`try_step`] is the pixel-by-pixel variant
/// that actually moves.
pub fn can_step(
    body: &Body,
    dir: Direction,
    steps: u32,
    grid: &TileGrid,
    solid_shapes: &[&Shape],
) -> bool {
    let (dx, dy) = dir.delta();
    let n = steps as f32;
    can_occupy(body, body.shape.x + dx * n, body.shape.y + dy * n, grid, solid_shapes)
}

/// Move `body` up to `steps` single pixels in `dir`, validating each pixel.
///
/// Stops at the last legal position; returns `true` only if every requested
/// pixel was taken. A partially completed move still counts as failure, but
/// the pixels already taken are kept.
pub fn try_step(
    body: &mut Body,
    dir: Direction,
    steps: u32,
    grid: &TileGrid,
    solid_shapes: &[&Shape],
) -> bool {
    let (dx, dy) = dir.delta();
    for _ in 0..steps {
        let nx = body.shape.x + dx;
        let ny = body.shape.y + dy;
        if !can_occupy(body, nx, ny, grid, solid_shapes) {
            return false;
        }
        body.shape.x = nx;
        body.shape.y = ny;
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
