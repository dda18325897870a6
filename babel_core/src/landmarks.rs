//! Landmarks: rooms and books with a fixed special meaning.
//!
//! Everything here is a pure function of coordinates or addresses. Whether a
//! reader has already found a clue is the caller's state, not ours.

use crate::coords::{HexId, PageRef};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::Serialize;

/// Every multiple of this hex id is a crimson hexagon.
pub const CRIMSON_HEX: u64 = 18_990_824;

/// Purified rooms: `hex mod PURIFIED_PERIOD < PURIFIED_SPAN` (about 5%).
pub const PURIFIED_PERIOD: u64 = 100_003;
pub const PURIFIED_SPAN: u64 = 5_000;

/// Kind of room, derived from its hex id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Ordinary,
    Purified,
    Crimson,
}

impl RoomKind {
    /// Crimson takes precedence over purified.
    pub fn of(hex: &HexId) -> Self {
        let id = hex.as_biguint();
        let crimson = BigUint::from(CRIMSON_HEX);
        if *id == crimson || (!id.is_zero() && (id % &crimson).is_zero()) {
            RoomKind::Crimson
        } else if id % PURIFIED_PERIOD < BigUint::from(PURIFIED_SPAN) {
            RoomKind::Purified
        } else {
            RoomKind::Ordinary
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoomKind::Ordinary => "ordinary",
            RoomKind::Purified => "purified",
            RoomKind::Crimson => "crimson",
        }
    }
}

/// Maps any seed onto a purified room, spreading seeds across periods.
pub fn purified_hex(seed: &BigUint) -> HexId {
    let span = BigUint::from(PURIFIED_SPAN);
    let offset = seed % &span;
    HexId::new(seed / &span * PURIFIED_PERIOD + offset)
}

const PURIFIER_QUOTES: [&str; 5] = [
    "Others, inversely, believed that it was fundamental to eliminate useless works.",
    "They invaded the hexagons, showed credentials that were not always false, leafed through a volume with displeasure and condemned whole shelves.",
    "Their ascetic, hygienic furor caused the senseless perdition of millions of books.",
    "We know: for every rational line there are leagues of senseless cacophony.",
    "It is true that the most ancient people, the first librarians, used a language quite different from the one we now speak.",
];

/// Plaque text for a purified room, chosen by `hex mod 5`.
pub fn purifier_quote(hex: &HexId) -> &'static str {
    let index = (hex.as_biguint() % PURIFIER_QUOTES.len()).to_usize().unwrap_or(0);
    PURIFIER_QUOTES[index]
}

// =============================================================================
// CATALOG
// =============================================================================

/// Location of the catalog of catalogs: hex 271828182845, wall 2, shelf 1, volume 16, page 0.
pub fn catalog_page() -> PageRef {
    PageRef::new(271_828_182_845u64, 2, 1, 16, 0)
}

const CATALOG_TEXT: [&str; 16] = [
    "this volume contains the index of indices. it is the",
    "compendium that the librarians sought for centuries.",
    "within these pages the library describes itself, its",
    "structure, its infinite hexagonal galleries, the",
    "twenty nine symbols, the four hundred ten pages of",
    "each volume, the thirty two volumes on each shelf,",
    "the five shelves on each wall, the four walls of",
    "books, and the two passages that connect each room",
    "to its neighbors. the ventilation shaft that barely",
    "suffices, the spiral staircase that plunges into",
    "the abyss and rises to distant heights. the mirror",
    "that faithfully duplicates appearances. the library",
    "is a sphere whose exact center is any hexagon and",
    "whose circumference is inaccessible. you who read",
    "these words, you are that librarian, analogous to",
    "a god.",
];

/// The catalog's text as `lines` lines of exactly `width` characters.
pub fn catalog_lines(lines: usize, width: usize) -> Vec<String> {
    CATALOG_TEXT
        .iter()
        .copied()
        .chain(std::iter::repeat(""))
        .take(lines)
        .map(|line| format!("{:<width$}", line, width = width).chars().take(width).collect())
        .collect()
}

// =============================================================================
// CLUES
// =============================================================================

/// A clue revealed when a page's first line address matches a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Clue {
    pub index: usize,
    pub text: &'static str,
}

const CLUES: [(u64, &str); 3] = [
    (
        777_777,
        "the catalog of catalogs speaks from hexagon two seven one eight two eight",
    ),
    (
        1_234_567,
        "seek the book of the man who has read all books on wall three shelf two",
    ),
    (
        7_777_777,
        "volume seventeen page one reveals what the library knows of itself",
    ),
];

/// First clue whose trigger `t` satisfies `address mod (t·100) < 100`; address 0 never matches.
pub fn clue_at(address: &BigUint) -> Option<Clue> {
    if address.is_zero() {
        return None;
    }
    let window = BigUint::from(100u32);
    CLUES
        .iter()
        .enumerate()
        .find(|(_, (trigger, _))| address % (*trigger * 100) < window)
        .map(|(index, &(_, text))| Clue { index, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_kinds() {
        assert_eq!(RoomKind::of(&HexId::from(CRIMSON_HEX)), RoomKind::Crimson);
        assert_eq!(RoomKind::of(&HexId::from(CRIMSON_HEX * 3)), RoomKind::Crimson);
        // Zero is a multiple of everything but is not crimson.
        assert_eq!(RoomKind::of(&HexId::from(0u64)), RoomKind::Purified);
        assert_eq!(RoomKind::of(&HexId::from(4_999u64)), RoomKind::Purified);
        assert_eq!(RoomKind::of(&HexId::from(5_000u64)), RoomKind::Ordinary);
        assert_eq!(RoomKind::of(&HexId::from(PURIFIED_PERIOD + 12)), RoomKind::Purified);
    }

    #[test]
    fn test_purified_hex() {
        for seed in [0u64, 1, 4_999, 5_000, 123_456_789, u64::MAX] {
            let hex = purified_hex(&BigUint::from(seed));
            assert_ne!(RoomKind::of(&hex), RoomKind::Ordinary, "seed {}", seed);
        }
    }

    #[test]
    fn test_purifier_quotes() {
        assert!(purifier_quote(&HexId::from(0u64)).starts_with("Others, inversely"));
        assert!(purifier_quote(&HexId::from(4u64)).starts_with("It is true"));
        assert_eq!(purifier_quote(&HexId::from(7u64)), PURIFIER_QUOTES[2]);
        assert_eq!(purifier_quote(&HexId::from(100_003u64)), PURIFIER_QUOTES[3]);

        let big = HexId::new(BigUint::from(29u32).pow(70) + 1u32);
        // 29 ≡ 4 (mod 5), so 29^70 ≡ 1 and the id is ≡ 2.
        assert_eq!(purifier_quote(&big), PURIFIER_QUOTES[2]);
    }

    #[test]
    fn test_catalog_lines() {
        let lines = catalog_lines(40, 80);
        assert_eq!(lines.len(), 40);
        assert!(lines.iter().all(|l| l.chars().count() == 80));
        assert!(lines[0].starts_with("this volume contains"));
        assert_eq!(lines[39], " ".repeat(80));

        let narrow = catalog_lines(2, 10);
        assert_eq!(narrow, vec!["this volum".to_string(), "compendium".to_string()]);
    }

    #[test]
    fn test_clues() {
        assert!(clue_at(&BigUint::zero()).is_none());
        assert_eq!(clue_at(&BigUint::from(77_777_700u64)).unwrap().index, 0);
        assert_eq!(clue_at(&BigUint::from(77_777_799u64)).unwrap().index, 0);
        assert!(clue_at(&BigUint::from(77_777_800u64)).is_none());
        assert_eq!(clue_at(&BigUint::from(123_456_742u64)).unwrap().index, 1);
        assert!(clue_at(&BigUint::from(1_000_000u64)).is_none());
        // The first hundred addresses fall inside every trigger's window.
        assert_eq!(clue_at(&BigUint::from(42u64)).unwrap().index, 0);
    }
}
