//! Tile grid storage.
//!
//! A [`TileGrid`] is the single shared mutable world the simulation walks
//! through. Correctness under mutation relies on the single-threaded,
//! single-tick-at-a-time execution model, not on locking; the type exposes
//! no concurrent-mutation API.

use std::cell::OnceCell;

use tracing::warn;

use crate::tile::TileCode;
use crate::StageError;

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// A 2D array of tile codes with a closed-world boundary.
///
/// Any coordinate outside `[0, width) x [0, height)` reads as
/// [`TileCode::Solid`]. The grid also keeps a read-only "reference" copy of
/// itself, lazily captured the first time it is consulted, which deformation
/// effects use to restore tiles behind themselves (a moving platform writing
/// Solid under itself and Hollow behind it).
#[derive(Debug)]
pub struct TileGrid {
    width: i32,
    height: i32,
    /// Pixels per cell; the movement layer uses this to map entity
    /// coordinates onto cells.
    tile_size: f32,
    /// Row-major cell data.
    tiles: Vec<TileCode>,
    /// Lazily captured snapshot of the tile data at first request.
    reference: OnceCell<Vec<TileCode>>,
}

impl TileGrid {
    /// An all-Hollow grid of the given cell dimensions.
    ///
    /// # Panics
    ///
    /// Panics on non-positive dimensions or a non-positive tile size; those
    /// are construction-time contract violations, not runtime conditions.
    pub fn new(width: i32, height: i32, tile_size: f32) -> Self {
        assert!(
            width > 0 && height > 0,
            "grid dimensions must be positive, got {width}x{height}"
        );
        assert!(
            tile_size > 0.0 && tile_size.is_finite(),
            "tile size must be positive and finite, got {tile_size}"
        );
        Self {
            width,
            height,
            tile_size,
            tiles: vec![TileCode::Hollow; width as usize * height as usize],
            reference: OnceCell::new(),
        }
    }

    /// Decode a grid from the level loader's row-major byte matrix.
    pub fn from_bytes(
        width: i32,
        height: i32,
        tile_size: f32,
        bytes: &[u8],
    ) -> Result<Self, StageError> {
        let expected = width.max(0) as usize * height.max(0) as usize;
        if bytes.len() != expected {
            return Err(StageError::DimensionMismatch {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        let mut grid = Self::new(width, height, tile_size);
        for (i, &b) in bytes.iter().enumerate() {
            let x = i as i32 % width;
            let y = i as i32 / width;
            grid.tiles[i] = TileCode::from_byte(b, x, y)?;
        }
        Ok(grid)
    }

    // -- dimensions ---------------------------------------------------------

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Pixels per cell.
    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Stage width in pixels.
    #[inline]
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    /// Stage height in pixels.
    #[inline]
    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    /// Whether the cell coordinate lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    // -- cell access --------------------------------------------------------

    /// The code at cell `(x, y)`; Solid for out-of-range coordinates.
    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> TileCode {
        if self.in_bounds(x, y) {
            self.tiles[(y * self.width + x) as usize]
        } else {
            TileCode::Solid
        }
    }

    /// Overwrite the code at cell `(x, y)`.
    ///
    /// This is the deformation hook for game content; the engine itself
    /// never writes tiles. Out-of-bounds writes are dropped with a warning.
    /// No validation is done beyond bounds -- callers are responsible for
    /// not corrupting the Start/Goal markers.
    pub fn set_tile(&mut self, x: i32, y: i32, code: TileCode) {
        if self.in_bounds(x, y) {
            self.tiles[(y * self.width + x) as usize] = code;
        } else {
            warn!(x, y, ?code, "set_tile outside grid bounds; dropped");
        }
    }

    /// The original (pre-deformation) code at cell `(x, y)`.
    ///
    /// The reference copy is captured lazily on the first call, so any
    /// deformation applied before the first consultation becomes part of
    /// the reference. Solid for out-of-range coordinates.
    pub fn reference_tile_at(&self, x: i32, y: i32) -> TileCode {
        if self.in_bounds(x, y) {
            let reference = self.reference.get_or_init(|| self.tiles.clone());
            reference[(y * self.width + x) as usize]
        } else {
            TileCode::Solid
        }
    }

    /// Restore cell `(x, y)` to its reference code.
    pub fn restore_tile(&mut self, x: i32, y: i32) {
        let code = self.reference_tile_at(x, y);
        if self.in_bounds(x, y) {
            self.tiles[(y * self.width + x) as usize] = code;
        }
    }

    /// The first [`TileCode::Start`] cell in row-major order, if any.
    pub fn find_start(&self) -> Option<(i32, i32)> {
        self.tiles
            .iter()
            .position(|&t| t == TileCode::Start)
            .map(|i| (i as i32 % self.width, i as i32 / self.width))
    }

    /// The current cell data as row-major wire bytes. Used for state
    /// hashing and snapshots.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.tiles.iter().map(|t| t.to_byte()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
