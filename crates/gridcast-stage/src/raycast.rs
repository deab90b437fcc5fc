//! Grid-walking raycasts.
//!
//! All walking queries share one integer line walk between cell centers.
//! The walk compares accumulated midpoint-crossing terms instead of
//! stepping in floating point, so it visits *every* cell the ideal line
//! passes through regardless of slope -- floating-point stepping can tunnel
//! through a single-cell-wide Solid wall at shallow angles, the integer
//! walk cannot.

use crate::grid::TileGrid;
use crate::tile::TileCode;

// ---------------------------------------------------------------------------
// Line walk
// ---------------------------------------------------------------------------

/// Walk every cell the segment between the centers of `(x0, y0)` and
/// `(x1, y1)` passes through, in order. `visit` returns `false` to stop;
/// the stopping cell is returned. Exact corner crossings step diagonally.
fn walk_line(
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    mut visit: impl FnMut(i32, i32) -> bool,
) -> Option<(i32, i32)> {
    let dx = i64::from(x1) - i64::from(x0);
    let dy = i64::from(y1) - i64::from(y0);
    let nx = dx.abs();
    let ny = dy.abs();
    let step_x: i32 = if dx > 0 { 1 } else { -1 };
    let step_y: i32 = if dy > 0 { 1 } else { -1 };

    let (mut x, mut y) = (x0, y0);
    if !visit(x, y) {
        return Some((x, y));
    }

    let (mut ix, mut iy) = (0i64, 0i64);
    while ix < nx || iy < ny {
        // Which cell boundary does the ideal line cross first? The line
        // crosses the next vertical boundary at parameter (1+2ix)/(2nx) and
        // the next horizontal boundary at (1+2iy)/(2ny); compare the cross-
        // multiplied terms to stay in integers.
        let cmp = (1 + 2 * ix) * ny - (1 + 2 * iy) * nx;
        if cmp == 0 {
            x += step_x;
            y += step_y;
            ix += 1;
            iy += 1;
        } else if cmp < 0 {
            x += step_x;
            ix += 1;
        } else {
            y += step_y;
            iy += 1;
        }
        if !visit(x, y) {
            return Some((x, y));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Walk from `(x0, y0)` toward `(x1, y1)` and return the first Solid cell
/// encountered (out-of-bounds cells read as Solid). `None` if the walk
/// reaches the destination unobstructed.
///
/// This is the truncation point of a directed ray; to project a ray past
/// the destination, first extend it with [`find_edge_point`] and walk to
/// the cell containing the returned edge point.
pub fn find_wall_point(grid: &TileGrid, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(i32, i32)> {
    walk_line(x0, y0, x1, y1, |x, y| grid.tile_at(x, y) != TileCode::Solid)
}

/// Walk from `(x0, y0)` toward `(x1, y1)` and return the first cell whose
/// code matches `code`. Returns `None` if the walk exits the grid or
/// reaches the destination before matching.
pub fn search_tile(
    grid: &TileGrid,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    code: TileCode,
) -> Option<(i32, i32)> {
    let mut found = None;
    walk_line(x0, y0, x1, y1, |x, y| {
        if !grid.in_bounds(x, y) {
            return false;
        }
        if grid.tile_at(x, y) == code {
            found = Some((x, y));
            return false;
        }
        true
    });
    found
}

/// Whether the straight line from `(x0, y0)` to `(x1, y1)` is free of
/// Solid cells, endpoints included. This is the primitive behind every
/// "can X see Y" visibility query.
pub fn solid_space(grid: &TileGrid, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
    find_wall_point(grid, x0, y0, x1, y1).is_none()
}

/// Extend the observer-to-target direction until it exits the stage's
/// outer rectangle and return the exit point, in pixels.
///
/// Not a grid walk -- a closed-form ray/box-boundary intersection, used to
/// project firing solutions to the map edge when no obstruction is found.
/// A coincident observer and target has no direction; the observer point
/// is returned unchanged.
pub fn find_edge_point(grid: &TileGrid, obs: (f32, f32), tar: (f32, f32)) -> (f32, f32) {
    let dx = tar.0 - obs.0;
    let dy = tar.1 - obs.1;
    if dx == 0.0 && dy == 0.0 {
        return obs;
    }

    let mut t = f32::INFINITY;
    if dx > 0.0 {
        t = t.min((grid.pixel_width() - obs.0) / dx);
    } else if dx < 0.0 {
        t = t.min(-obs.0 / dx);
    }
    if dy > 0.0 {
        t = t.min((grid.pixel_height() - obs.1) / dy);
    } else if dy < 0.0 {
        t = t.min(-obs.1 / dy);
    }
    (obs.0 + t * dx, obs.1 + t * dy)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_grid() -> TileGrid {
        TileGrid::new(10, 10, 32.0)
    }

    // -- 1. Wall search ------------------------------------------------------

    #[test]
    fn finds_first_wall_on_a_row() {
        let mut grid = empty_grid();
        grid.set_tile(4, 0, TileCode::Solid);
        grid.set_tile(7, 0, TileCode::Solid);
        assert_eq!(find_wall_point(&grid, 0, 0, 9, 0), Some((4, 0)));
    }

    #[test]
    fn unobstructed_walk_finds_no_wall() {
        let grid = empty_grid();
        assert_eq!(find_wall_point(&grid, 0, 0, 9, 9), None);
    }

    #[test]
    fn walk_leaving_the_grid_hits_the_closed_world() {
        let grid = empty_grid();
        // Walking toward a point outside the grid: the first out-of-bounds
        // cell reads as Solid.
        assert_eq!(find_wall_point(&grid, 8, 5, 12, 5), Some((10, 5)));
    }

    #[test]
    fn solid_start_cell_is_the_wall() {
        let mut grid = empty_grid();
        grid.set_tile(2, 2, TileCode::Solid);
        assert_eq!(find_wall_point(&grid, 2, 2, 8, 2), Some((2, 2)));
    }

    // -- 2. Tile search ------------------------------------------------------

    #[test]
    fn search_finds_tile_on_the_diagonal() {
        let mut grid = empty_grid();
        grid.set_tile(3, 3, TileCode::Solid);
        assert_eq!(search_tile(&grid, 0, 0, 6, 6, TileCode::Solid), Some((3, 3)));
    }

    #[test]
    fn search_misses_tile_off_the_line() {
        let mut grid = empty_grid();
        grid.set_tile(3, 4, TileCode::Solid);
        assert_eq!(search_tile(&grid, 0, 0, 6, 6, TileCode::Solid), None);
    }

    #[test]
    fn search_stops_when_the_walk_exits_the_grid() {
        let mut grid = empty_grid();
        grid.set_tile(5, 0, TileCode::Goal);
        // The walk leaves the grid at x = -1 before any Goal is seen.
        assert_eq!(search_tile(&grid, 2, 0, -5, 0, TileCode::Goal), None);
    }

    #[test]
    fn search_can_look_for_any_code() {
        let mut grid = empty_grid();
        grid.set_tile(2, 0, TileCode::Lethal);
        grid.set_tile(5, 0, TileCode::Area7);
        assert_eq!(search_tile(&grid, 0, 0, 9, 0, TileCode::Area7), Some((5, 0)));
        assert_eq!(search_tile(&grid, 0, 0, 9, 0, TileCode::Lethal), Some((2, 0)));
    }

    // -- 3. Visibility -------------------------------------------------------

    #[test]
    fn clear_line_is_visible() {
        let grid = empty_grid();
        assert!(solid_space(&grid, 1, 1, 8, 4));
    }

    #[test]
    fn wall_on_the_line_blocks_visibility() {
        let mut grid = empty_grid();
        grid.set_tile(5, 2, TileCode::Solid);
        // (0,0) -> (9,4) passes through (5,2)?  The midpoint-crossing walk
        // visits it: at x=5 the line's y is 2.22.
        assert!(!solid_space(&grid, 0, 0, 9, 4));
    }

    #[test]
    fn shallow_line_cannot_tunnel_through_a_wall() {
        // A full vertical wall with no gaps: every crossing line must hit
        // it, even at the shallowest slopes.
        let mut grid = empty_grid();
        for y in 0..10 {
            grid.set_tile(5, y, TileCode::Solid);
        }
        for y1 in 0..10 {
            assert!(
                !solid_space(&grid, 0, 0, 9, y1),
                "line to (9, {y1}) tunneled through the wall"
            );
        }
    }

    #[test]
    fn degenerate_walk_is_the_single_cell() {
        let mut grid = empty_grid();
        assert!(solid_space(&grid, 4, 4, 4, 4));
        grid.set_tile(4, 4, TileCode::Solid);
        assert!(!solid_space(&grid, 4, 4, 4, 4));
    }

    #[test]
    fn corner_crossing_steps_diagonally() {
        // (0,0) -> (2,2) passes exactly through the corner between the four
        // center cells; the walk steps diagonally rather than visiting the
        // off-diagonal neighbors.
        let mut grid = empty_grid();
        grid.set_tile(1, 0, TileCode::Solid);
        grid.set_tile(0, 1, TileCode::Solid);
        assert!(solid_space(&grid, 0, 0, 2, 2));
        grid.set_tile(1, 1, TileCode::Solid);
        assert!(!solid_space(&grid, 0, 0, 2, 2));
    }

    // -- 4. Edge projection --------------------------------------------------

    #[test]
    fn edge_point_projects_along_the_positive_axis() {
        let grid = empty_grid(); // 320x320 pixels
        let edge = find_edge_point(&grid, (160.0, 160.0), (200.0, 160.0));
        assert_eq!(edge, (320.0, 160.0));
    }

    #[test]
    fn edge_point_projects_into_a_corner_quadrant() {
        let grid = empty_grid();
        // Direction (1, 1) from the center exits at the bottom-right corner.
        let edge = find_edge_point(&grid, (160.0, 160.0), (161.0, 161.0));
        assert_eq!(edge, (320.0, 320.0));
    }

    #[test]
    fn edge_point_picks_the_nearer_boundary() {
        let grid = empty_grid();
        // From (300, 160) heading right and slightly down: the x boundary
        // (20 pixels away) comes long before the y boundary.
        let edge = find_edge_point(&grid, (300.0, 160.0), (310.0, 161.0));
        assert_eq!(edge, (320.0, 162.0));
    }

    #[test]
    fn edge_point_heading_negative_exits_at_zero() {
        let grid = empty_grid();
        let edge = find_edge_point(&grid, (160.0, 100.0), (160.0, 50.0));
        assert_eq!(edge, (160.0, 0.0));
    }

    #[test]
    fn coincident_observer_and_target_return_observer() {
        let grid = empty_grid();
        let edge = find_edge_point(&grid, (77.0, 88.0), (77.0, 88.0));
        assert_eq!(edge, (77.0, 88.0));
        assert!(!edge.0.is_nan() && !edge.1.is_nan());
    }
}
