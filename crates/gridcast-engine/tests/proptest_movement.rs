//! Property tests for movement validation.
//!
//! The central invariant is containment: no validated position ever puts
//! the footprint over a Solid tile or outside the stage, for any grid and
//! any entity size up to one tile per axis. At that size the footprint
//! spans at most two cells per axis, so the validator's perimeter edge
//! walk sees every covered cell and the invariant is exact.

use gridcast_engine::prelude::*;
use proptest::prelude::*;

const TILE: f32 = 16.0;
const CELLS: i32 = 12;

/// Checks the footprint against every cell it covers, the exhaustive way
/// the validator's edge walk is supposed to approximate.
fn overlaps_solid_exhaustive(shape: &Shape, grid: &TileGrid) -> bool {
    let (left, top, right, bottom) = shape.aabb();
    let cx0 = (left / TILE).floor() as i32;
    let cy0 = (top / TILE).floor() as i32;
    let cx1 = (((right - 1e-3).max(left)) / TILE).floor() as i32;
    let cy1 = (((bottom - 1e-3).max(top)) / TILE).floor() as i32;
    (cy0..=cy1).any(|cy| (cx0..=cx1).any(|cx| grid.tile_at(cx, cy) == TileCode::Solid))
}

fn arb_grid() -> impl Strategy<Value = Vec<(i32, i32)>> {
    proptest::collection::vec((0..CELLS, 0..CELLS), 0..24)
}

fn entity_size() -> impl Strategy<Value = f32> {
    // Quarter-pixel granularity keeps the arithmetic exact; at most one
    // tile per axis.
    (4..=(TILE as i32 * 4)).prop_map(|q| q as f32 * 0.25)
}

fn position() -> impl Strategy<Value = f32> {
    (0..(CELLS * TILE as i32 * 4)).prop_map(|q| q as f32 * 0.25)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    // -- 1. Movement containment ----------------------------------------------

    #[test]
    fn validated_positions_never_overlap_solid(
        walls in arb_grid(),
        w in entity_size(), h in entity_size(),
        x in position(), y in position(),
    ) {
        let mut grid = TileGrid::new(CELLS, CELLS, TILE);
        for &(wx, wy) in &walls {
            grid.set_tile(wx, wy, TileCode::Solid);
        }
        let body = Body::new(Shape::rect(x, y, w, h));
        if can_occupy(&body, x, y, &grid, &[]) {
            let shape = Shape::rect(x, y, w, h);
            prop_assert!(!overlaps_solid_exhaustive(&shape, &grid));
            let (left, top, right, bottom) = shape.aabb();
            prop_assert!(left >= 0.0 && top >= 0.0);
            prop_assert!(right <= grid.pixel_width() && bottom <= grid.pixel_height());
        }
    }

    // -- 2. Stepping preserves containment ------------------------------------

    #[test]
    fn try_step_never_ends_inside_solid(
        walls in arb_grid(),
        size in entity_size(),
        x in position(), y in position(),
        steps in 0..64u32,
        dir_idx in 0..4usize,
    ) {
        let mut grid = TileGrid::new(CELLS, CELLS, TILE);
        for &(wx, wy) in &walls {
            grid.set_tile(wx, wy, TileCode::Solid);
        }
        let mut body = Body::new(Shape::rect(x, y, size, size));
        // Only start from legal positions; illegal starts cannot move at all.
        prop_assume!(can_occupy(&body, x, y, &grid, &[]));

        let dir = [Direction::Up, Direction::Down, Direction::Left, Direction::Right][dir_idx];
        let _ = try_step(&mut body, dir, steps, &grid, &[]);
        prop_assert!(!overlaps_solid_exhaustive(&body.shape, &grid));
        prop_assert!(can_occupy(&body, body.shape.x, body.shape.y, &grid, &[]));
    }

    // -- 3. Blocked moves keep partial progress on the axis --------------------

    #[test]
    fn try_step_moves_along_one_axis_only(
        size in entity_size(),
        x in position(), y in position(),
        steps in 0..32u32,
        dir_idx in 0..4usize,
    ) {
        let grid = TileGrid::new(CELLS, CELLS, TILE);
        let mut body = Body::new(Shape::rect(x, y, size, size));
        prop_assume!(can_occupy(&body, x, y, &grid, &[]));

        let dir = [Direction::Up, Direction::Down, Direction::Left, Direction::Right][dir_idx];
        let ok = try_step(&mut body, dir, steps, &grid, &[]);
        let (dx, dy) = (body.shape.x - x, body.shape.y - y);
        match dir {
            Direction::Left | Direction::Right => prop_assert_eq!(dy, 0.0),
            Direction::Up | Direction::Down => prop_assert_eq!(dx, 0.0),
        }
        let moved = dx.abs() + dy.abs();
        prop_assert!(moved <= steps as f32);
        if ok {
            prop_assert_eq!(moved, steps as f32);
        }
    }
}
