//! Tile codes and code sets.

use serde::{Deserialize, Serialize};

use crate::StageError;

// ---------------------------------------------------------------------------
// TileCode
// ---------------------------------------------------------------------------

/// The discrete classification of a single grid cell.
///
/// The engine interprets only `Solid` (blocks movement and raycasts, and is
/// what out-of-bounds cells read as) and `Hollow` (passable). `Start`,
/// `Goal` and `Lethal` are classified and reported but carry no engine
/// behavior; the ten area-trigger codes have caller-defined semantics.
///
/// The discriminants are the wire values the level loader supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileCode {
    /// Passable empty space.
    Hollow = 0,
    /// Blocks movement; counts as "wall" for raycasts.
    Solid = 1,
    /// Spawn marker for the controlled entity.
    Start = 2,
    /// Level exit marker.
    Goal = 3,
    /// Kills entities standing on it (content decides what "kills" means).
    Lethal = 4,
    /// Area trigger 0. Caller-defined semantics.
    Area0 = 5,
    /// Area trigger 1.
    Area1 = 6,
    /// Area trigger 2.
    Area2 = 7,
    /// Area trigger 3.
    Area3 = 8,
    /// Area trigger 4.
    Area4 = 9,
    /// Area trigger 5.
    Area5 = 10,
    /// Area trigger 6.
    Area6 = 11,
    /// Area trigger 7.
    Area7 = 12,
    /// Area trigger 8.
    Area8 = 13,
    /// Area trigger 9.
    Area9 = 14,
}

impl TileCode {
    /// All codes, in wire order.
    pub const ALL: [TileCode; 15] = [
        TileCode::Hollow,
        TileCode::Solid,
        TileCode::Start,
        TileCode::Goal,
        TileCode::Lethal,
        TileCode::Area0,
        TileCode::Area1,
        TileCode::Area2,
        TileCode::Area3,
        TileCode::Area4,
        TileCode::Area5,
        TileCode::Area6,
        TileCode::Area7,
        TileCode::Area8,
        TileCode::Area9,
    ];

    /// Decode a wire byte. Unknown bytes are a load-time error; the `(x, y)`
    /// cell is threaded through for the error message.
    pub fn from_byte(code: u8, x: i32, y: i32) -> Result<Self, StageError> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or(StageError::UnknownTileCode { code, x, y })
    }

    /// The wire byte for this code.
    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// The numbered area trigger, if this is one.
    pub fn area_trigger(self) -> Option<u8> {
        let b = self.to_byte();
        (b >= TileCode::Area0.to_byte()).then(|| b - TileCode::Area0.to_byte())
    }
}

// ---------------------------------------------------------------------------
// TileCodeSet
// ---------------------------------------------------------------------------

/// A small set of tile codes, stored as a 15-bit mask.
///
/// Used for an entity's per-tick tile occupancy: which non-Hollow codes its
/// footprint currently touches. Cleared and recomputed every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCodeSet(u16);

impl TileCodeSet {
    /// The empty set.
    pub const EMPTY: TileCodeSet = TileCodeSet(0);

    /// Insert a code.
    #[inline]
    pub fn insert(&mut self, code: TileCode) {
        self.0 |= 1 << code.to_byte();
    }

    /// Whether the set contains `code`.
    #[inline]
    pub fn contains(self, code: TileCode) -> bool {
        self.0 & (1 << code.to_byte()) != 0
    }

    /// Remove every code.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Whether the set is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained codes in wire order.
    pub fn iter(self) -> impl Iterator<Item = TileCode> {
        TileCode::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// The raw bitmask. Stable across runs; used by the state hash.
    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }
}

impl FromIterator<TileCode> for TileCodeSet {
    fn from_iter<I: IntoIterator<Item = TileCode>>(iter: I) -> Self {
        let mut set = TileCodeSet::EMPTY;
        for code in iter {
            set.insert(code);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- 1. Wire round-trip --------------------------------------------------

    #[test]
    fn every_code_round_trips_through_bytes() {
        for code in TileCode::ALL {
            assert_eq!(TileCode::from_byte(code.to_byte(), 0, 0).unwrap(), code);
        }
    }

    #[test]
    fn unknown_byte_is_an_error() {
        let err = TileCode::from_byte(15, 2, 3).unwrap_err();
        match err {
            StageError::UnknownTileCode { code, x, y } => {
                assert_eq!((code, x, y), (15, 2, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    // -- 2. Area triggers ----------------------------------------------------

    #[test]
    fn area_trigger_numbering() {
        assert_eq!(TileCode::Area0.area_trigger(), Some(0));
        assert_eq!(TileCode::Area9.area_trigger(), Some(9));
        assert_eq!(TileCode::Solid.area_trigger(), None);
        assert_eq!(TileCode::Lethal.area_trigger(), None);
    }

    // -- 3. Code sets --------------------------------------------------------

    #[test]
    fn set_insert_contains_clear() {
        let mut set = TileCodeSet::EMPTY;
        assert!(set.is_empty());
        set.insert(TileCode::Lethal);
        set.insert(TileCode::Area3);
        assert!(set.contains(TileCode::Lethal));
        assert!(set.contains(TileCode::Area3));
        assert!(!set.contains(TileCode::Solid));
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn set_iterates_in_wire_order() {
        let set: TileCodeSet = [TileCode::Area1, TileCode::Solid, TileCode::Goal]
            .into_iter()
            .collect();
        let codes: Vec<TileCode> = set.iter().collect();
        assert_eq!(codes, vec![TileCode::Solid, TileCode::Goal, TileCode::Area1]);
    }

    // -- 4. Serde round-trip -------------------------------------------------

    #[test]
    fn every_code_round_trips_through_serde() {
        for code in TileCode::ALL {
            let json = serde_json::to_string(&code).unwrap();
            let back: TileCode = serde_json::from_str(&json).unwrap();
            assert_eq!(back, code);
        }
    }

    #[test]
    fn code_set_round_trips_through_serde() {
        let set: TileCodeSet = [TileCode::Solid, TileCode::Lethal, TileCode::Area7]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        let back: TileCodeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.bits(), set.bits());
    }
}
