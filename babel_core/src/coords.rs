//! Coordinate codec: (hex, wall, shelf, volume, page, line) <-> linear address.
//!
//! The five in-room fields form a mixed-radix number, wall most significant
//! and line least significant. The hex id sits above them, unbounded:
//!
//! ```text
//! address = hex · lines_per_hex + (((wall·S + shelf)·V + volume)·P + page)·L + line   (mod N)
//! ```

use crate::error::{ConfigError, ValidationError};
use num_bigint::{BigUint, RandBigInt};
use num_traits::Num;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// LAYOUT
// =============================================================================

/// Radices of the in-room hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub walls: u32,
    pub shelves: u32,
    pub volumes: u32,
    pub pages: u32,
    pub lines: u32,
}

impl Layout {
    /// 4 walls × 5 shelves × 32 volumes × 410 pages × 40 lines.
    pub const REFERENCE: Layout = Layout {
        walls: 4,
        shelves: 5,
        volumes: 32,
        pages: 410,
        lines: 40,
    };

    /// Rejects zero radices and products that overflow a u64.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for field in Field::ALL {
            if self.radix(field) == 0 {
                return Err(ConfigError::ZeroRadix(field.name()));
            }
        }
        Field::ALL
            .iter()
            .try_fold(1u64, |acc, &f| acc.checked_mul(u64::from(self.radix(f))))
            .map(|_| ())
            .ok_or_else(|| ConfigError::LayoutTooLarge("more than u64::MAX".to_string()))
    }

    pub fn radix(&self, field: Field) -> u32 {
        match field {
            Field::Wall => self.walls,
            Field::Shelf => self.shelves,
            Field::Volume => self.volumes,
            Field::Page => self.pages,
            Field::Line => self.lines,
        }
    }

    /// Lines on one page.
    pub fn lines_per_page(&self) -> u64 {
        u64::from(self.lines)
    }

    pub fn lines_per_volume(&self) -> u64 {
        u64::from(self.pages) * self.lines_per_page()
    }

    pub fn lines_per_shelf(&self) -> u64 {
        u64::from(self.volumes) * self.lines_per_volume()
    }

    pub fn lines_per_wall(&self) -> u64 {
        u64::from(self.shelves) * self.lines_per_shelf()
    }

    /// Product of every radix: 10,496,000 for the reference layout.
    pub fn lines_per_hex(&self) -> u64 {
        u64::from(self.walls) * self.lines_per_wall()
    }

    /// Checks one field against its radix.
    pub fn check(&self, field: Field, value: u32) -> Result<(), ValidationError> {
        let radix = self.radix(field);
        if value < radix {
            Ok(())
        } else {
            Err(ValidationError::out_of_range(field.name(), value, radix))
        }
    }

    fn encode_local(&self, c: &Coordinates) -> Result<u64, ValidationError> {
        self.check(Field::Wall, c.wall)?;
        self.check(Field::Shelf, c.shelf)?;
        self.check(Field::Volume, c.volume)?;
        self.check(Field::Page, c.page)?;
        self.check(Field::Line, c.line)?;

        Ok(u64::from(c.wall) * self.lines_per_wall()
            + u64::from(c.shelf) * self.lines_per_shelf()
            + u64::from(c.volume) * self.lines_per_volume()
            + u64::from(c.page) * self.lines_per_page()
            + u64::from(c.line))
    }

    /// Splits an in-room offset into (wall, shelf, volume, page, line).
    fn decode_local(&self, mut local: u64) -> [u32; 5] {
        let mut take = |radix: u32| {
            let digit = (local % u64::from(radix)) as u32;
            local /= u64::from(radix);
            digit
        };
        let line = take(self.lines);
        let page = take(self.pages);
        let volume = take(self.volumes);
        let shelf = take(self.shelves);
        let wall = take(self.walls);
        [wall, shelf, volume, page, line]
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// The bounded coordinate fields, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Wall,
    Shelf,
    Volume,
    Page,
    Line,
}

impl Field {
    pub const ALL: [Field; 5] = [Field::Wall, Field::Shelf, Field::Volume, Field::Page, Field::Line];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Wall => "wall",
            Field::Shelf => "shelf",
            Field::Volume => "volume",
            Field::Page => "page",
            Field::Line => "line",
        }
    }
}

// =============================================================================
// HEX ID
// =============================================================================

/// Identifier of one hexagonal room. Unbounded.
///
/// Displays as uppercase base 36. Serializes as a decimal string so JSON
/// consumers never lose precision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexId(BigUint);

impl HexId {
    pub fn new(id: BigUint) -> Self {
        Self(id)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }

    /// Uppercase base-36 rendering.
    pub fn to_base36(&self) -> String {
        self.0.to_str_radix(36).to_ascii_uppercase()
    }

    /// Base-36 form shortened to `keep` leading and trailing characters.
    ///
    /// Ids at most `2 * keep` characters long are returned whole.
    pub fn abbreviated(&self, keep: usize) -> String {
        let full = self.to_base36();
        if full.len() <= keep * 2 {
            return full;
        }
        format!("{}...{}", &full[..keep], &full[full.len() - keep..])
    }

    /// Parses navigator input: hexadecimal first, then base 36.
    ///
    /// Blank input is hex 0. Strings made only of hex digits are read as
    /// hexadecimal even when they were produced by [`to_base36`](Self::to_base36);
    /// use [`from_base36`](Self::from_base36) to read a displayed id back.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        if s.chars().all(|c| c.is_ascii_hexdigit()) {
            return BigUint::from_str_radix(s, 16)
                .map(Self)
                .map_err(|_| ValidationError::InvalidHexId(input.to_string()));
        }
        Self::from_base36(s)
    }

    /// Strict base-36 parse (case-insensitive); inverse of `Display`.
    pub fn from_base36(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidHexId(input.to_string()));
        }
        BigUint::from_str_radix(&s.to_ascii_lowercase(), 36)
            .map(Self)
            .map_err(|_| ValidationError::InvalidHexId(input.to_string()))
    }

    /// Uniform draw from `[0, bound)`. `bound` must be positive.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bound: &BigUint) -> Self {
        Self(rng.gen_biguint_below(bound))
    }
}

impl From<u64> for HexId {
    fn from(id: u64) -> Self {
        Self(BigUint::from(id))
    }
}

impl From<BigUint> for HexId {
    fn from(id: BigUint) -> Self {
        Self(id)
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base36())
    }
}

impl FromStr for HexId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base36(s)
    }
}

impl Serialize for HexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for HexId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BigUint::from_str_radix(&s, 10)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// COORDINATES
// =============================================================================

/// Full position of one line. All fields 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub hex: HexId,
    pub wall: u32,
    pub shelf: u32,
    pub volume: u32,
    pub page: u32,
    pub line: u32,
}

impl Coordinates {
    /// The page this line sits on.
    pub fn page_ref(&self) -> PageRef {
        PageRef {
            hex: self.hex.clone(),
            wall: self.wall,
            shelf: self.shelf,
            volume: self.volume,
            page: self.page,
        }
    }
}

/// Position of one page (40 lines in the reference layout).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub hex: HexId,
    pub wall: u32,
    pub shelf: u32,
    pub volume: u32,
    pub page: u32,
}

impl PageRef {
    pub fn new(hex: impl Into<HexId>, wall: u32, shelf: u32, volume: u32, page: u32) -> Self {
        Self {
            hex: hex.into(),
            wall,
            shelf,
            volume,
            page,
        }
    }

    /// Coordinates of line `line` on this page.
    pub fn line(&self, line: u32) -> Coordinates {
        Coordinates {
            hex: self.hex.clone(),
            wall: self.wall,
            shelf: self.shelf,
            volume: self.volume,
            page: self.page,
            line,
        }
    }

    /// Checks every field except the hex id.
    pub fn validate(&self, layout: &Layout) -> Result<(), ValidationError> {
        layout.check(Field::Wall, self.wall)?;
        layout.check(Field::Shelf, self.shelf)?;
        layout.check(Field::Volume, self.volume)?;
        layout.check(Field::Page, self.page)
    }

    /// Following page of the same volume, `None` on the last page.
    pub fn next_page(&self, layout: &Layout) -> Option<PageRef> {
        self.page
            .checked_add(1)
            .filter(|&page| page < layout.pages)
            .map(|page| PageRef {
                page,
                ..self.clone()
            })
    }

    /// Preceding page of the same volume, `None` on page 0.
    pub fn prev_page(&self) -> Option<PageRef> {
        self.page.checked_sub(1).map(|page| PageRef {
            page,
            ..self.clone()
        })
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Mixed-radix conversion between coordinates and addresses in `[0, N)`.
#[derive(Debug, Clone)]
pub struct CoordinateCodec {
    layout: Layout,
    modulus: BigUint,
    lines_per_hex: BigUint,
}

impl CoordinateCodec {
    /// Builds a codec; the layout must fit strictly inside the address space.
    pub fn new(layout: Layout, modulus: BigUint) -> Result<Self, ConfigError> {
        layout.validate()?;
        let lines_per_hex = BigUint::from(layout.lines_per_hex());
        if lines_per_hex >= modulus {
            return Err(ConfigError::LayoutTooLarge(lines_per_hex.to_string()));
        }
        Ok(Self {
            layout,
            modulus,
            lines_per_hex,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn lines_per_hex(&self) -> &BigUint {
        &self.lines_per_hex
    }

    /// Number of hex ids whose every line has a distinct address: `⌊N / lines_per_hex⌋`.
    pub fn hex_count(&self) -> BigUint {
        &self.modulus / &self.lines_per_hex
    }

    /// Linear address of a line. Out-of-range fields are rejected, not wrapped.
    ///
    /// Hex ids at or beyond [`hex_count`](Self::hex_count) wrap modulo `N`.
    pub fn to_address(&self, coords: &Coordinates) -> Result<BigUint, ValidationError> {
        let local = self.layout.encode_local(coords)?;
        Ok((coords.hex.as_biguint() * &self.lines_per_hex + local) % &self.modulus)
    }

    /// Coordinates of an address.
    pub fn to_coords(&self, address: &BigUint) -> Coordinates {
        let hex = address / &self.lines_per_hex;
        let local = address % &self.lines_per_hex;
        // local < lines_per_hex <= u64::MAX, so it is at most one u64 digit.
        let local = local.iter_u64_digits().next().unwrap_or(0);
        let [wall, shelf, volume, page, line] = self.layout.decode_local(local);

        Coordinates {
            hex: HexId(hex),
            wall,
            shelf,
            volume,
            page,
            line,
        }
    }
}
