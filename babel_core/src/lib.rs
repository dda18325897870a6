//! Babel Core - the Library of every 80-symbol line
//!
//! No page is stored. Each line is computed from its coordinates through a
//! bijection between addresses and content in `[0, 29^80)`:
//! 1. **Coordinate Codec**: (hex, wall, shelf, volume, page, line) <-> address
//! 2. **Round Cipher**: four keyed affine rounds interleaved with digit permutations
//! 3. **Symbol Codec**: content number <-> 80 symbols over `" ,.a-z"`
//!
//! Reading runs the chain forward; [`Library::search`] runs it backward to
//! locate any text.

pub mod arith;
pub mod cipher;
pub mod config;
pub mod coords;
pub mod digits;
pub mod error;
pub mod landmarks;
pub mod library;
pub mod symbols;
pub mod vindication;

// Re-export key types for convenience
pub use config::{LibraryConfig, RoundKeyConfig};
pub use coords::{Coordinates, HexId, Layout, PageRef};
pub use error::{ArithmeticError, ConfigError, ValidationError};
pub use landmarks::{Clue, RoomKind};
pub use library::{Library, PageView};
pub use num_bigint::BigUint;
pub use vindication::{Vindication, VindicationScanner};
