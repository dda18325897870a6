//! The Library: reading pages and locating text.
//!
//! # Architecture
//!
//! ```text
//!   reading                                       locating
//!   ───────                                       ────────
//!   Coordinates                                   free text
//!       │ CoordinateCodec::to_address                 │ SymbolCodec::normalize
//!       ▼                                             ▼
//!   address ──► RoundCipher::encrypt        80 symbols ──► SymbolCodec::to_number
//!                      │                                          │
//!                      ▼                                          ▼
//!   content number ──► SymbolCodec::to_symbols     content number ──► RoundCipher::decrypt
//!                      │                                          │
//!                      ▼                                          ▼
//!                  80 symbols                      address ──► CoordinateCodec::to_coords
//! ```
//!
//! A [`Library`] is built once from a [`LibraryConfig`], is immutable and
//! `Send + Sync`, and can be shared freely by reference or `Arc`.

use crate::cipher::{RoundCipher, RoundKey};
use crate::config::LibraryConfig;
use crate::coords::{CoordinateCodec, Coordinates, HexId, Layout, PageRef};
use crate::digits::DigitPermutation;
use crate::error::{ConfigError, ValidationError};
use crate::landmarks::{self, Clue, RoomKind};
use crate::symbols::SymbolCodec;
use num_bigint::BigUint;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// A page as a reader sees it.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub page: PageRef,

    /// Content lines, top to bottom
    pub lines: Vec<String>,

    /// Kind of the room the page sits in
    pub room: RoomKind,

    /// True when the catalog text replaced the generated lines
    pub catalog: bool,

    /// Clue triggered by the page's first line, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clue: Option<Clue>,

    /// Plaque quote, shown in purified rooms only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purifier_quote: Option<&'static str>,
}

/// The validated, immutable library.
#[derive(Debug, Clone)]
pub struct Library {
    symbols: SymbolCodec,
    cipher: RoundCipher,
    coords: CoordinateCodec,
    line_length: usize,
}

impl Library {
    /// Validates `config` and precomputes every derived table.
    ///
    /// Fails if the alphabet, layout or permutation is malformed, or if any
    /// round multiplier has no inverse modulo the address space. Such a
    /// library would not be a bijection, so it is never built.
    pub fn new(config: &LibraryConfig) -> Result<Self, ConfigError> {
        config.check_shape()?;

        let symbols = SymbolCodec::new(&config.alphabet)?;
        let permutation = DigitPermutation::new(&config.permutation, symbols.base())?;
        let modulus = BigUint::from(symbols.base()).pow(config.line_length as u32);

        let rounds = config
            .rounds
            .iter()
            .enumerate()
            .map(|(round, key)| {
                let (multiplier, increment) = key.parse(round)?;
                RoundKey::new(&multiplier, &increment, &modulus)
                    .map_err(|source| ConfigError::Arithmetic { round, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let coords = CoordinateCodec::new(config.layout, modulus.clone())?;

        debug!(
            "Library ready: base={} line_length={} rounds={} lines_per_hex={}",
            symbols.base(),
            config.line_length,
            rounds.len(),
            coords.lines_per_hex()
        );

        Ok(Self {
            symbols,
            cipher: RoundCipher::new(modulus, rounds, permutation),
            coords,
            line_length: config.line_length,
        })
    }

    /// The library under the reference configuration.
    pub fn reference() -> Result<Self, ConfigError> {
        Self::new(&LibraryConfig::reference())
    }

    /// Size of the address and content space, `N`.
    pub fn modulus(&self) -> &BigUint {
        self.cipher.modulus()
    }

    pub fn layout(&self) -> &Layout {
        self.coords.layout()
    }

    /// Symbols per line.
    pub fn line_length(&self) -> usize {
        self.line_length
    }

    pub fn symbols(&self) -> &SymbolCodec {
        &self.symbols
    }

    pub fn cipher(&self) -> &RoundCipher {
        &self.cipher
    }

    pub fn coordinates(&self) -> &CoordinateCodec {
        &self.coords
    }

    // -------------------------------------------------------------------------
    // Core mapping
    // -------------------------------------------------------------------------

    /// Address → content number.
    pub fn encrypt(&self, address: &BigUint) -> BigUint {
        self.cipher.encrypt(address)
    }

    /// Content number → address.
    pub fn decrypt(&self, content: &BigUint) -> BigUint {
        self.cipher.decrypt(content)
    }

    pub fn coords_to_address(&self, coords: &Coordinates) -> Result<BigUint, ValidationError> {
        self.coords.to_address(coords)
    }

    pub fn address_to_coords(&self, address: &BigUint) -> Coordinates {
        self.coords.to_coords(address)
    }

    /// Content of the line at `address`.
    pub fn render(&self, address: &BigUint) -> String {
        self.symbols
            .to_symbols(&self.cipher.encrypt(address), self.line_length)
    }

    // -------------------------------------------------------------------------
    // Reading
    // -------------------------------------------------------------------------

    /// One line of content.
    pub fn line(&self, coords: &Coordinates) -> Result<String, ValidationError> {
        Ok(self.render(&self.coords.to_address(coords)?))
    }

    /// Every line of a page, in line order.
    pub fn generate_page(&self, page: &PageRef) -> Result<Vec<String>, ValidationError> {
        page.validate(self.layout())?;
        (0..self.layout().lines)
            .map(|line| self.line(&page.line(line)))
            .collect()
    }

    /// The reader's view of a page.
    ///
    /// At the catalog's coordinates the fixed catalog text is shown instead
    /// of generated content. Clues are checked against the address of the
    /// page's first line.
    pub fn read_page(&self, page: &PageRef) -> Result<PageView, ValidationError> {
        page.validate(self.layout())?;
        let catalog = *page == landmarks::catalog_page();
        let lines = if catalog {
            landmarks::catalog_lines(self.layout().lines as usize, self.line_length)
        } else {
            self.generate_page(page)?
        };
        let first_line = self.coords.to_address(&page.line(0))?;
        let room = RoomKind::of(&page.hex);

        Ok(PageView {
            page: page.clone(),
            lines,
            room,
            catalog,
            clue: landmarks::clue_at(&first_line),
            purifier_quote: (room == RoomKind::Purified).then(|| landmarks::purifier_quote(&page.hex)),
        })
    }

    // -------------------------------------------------------------------------
    // Locating
    // -------------------------------------------------------------------------

    /// Search normalization: lowercase, drop foreign characters, pad or truncate.
    pub fn normalize(&self, text: &str) -> String {
        self.symbols.normalize(text, self.line_length)
    }

    /// Finds the coordinates of the line whose content is `normalize(text)`.
    ///
    /// Never fails. Text with no alphabet characters normalizes to a line of
    /// padding and is located like any other line.
    pub fn search(&self, text: &str) -> Coordinates {
        let normalized = self.normalize(text);
        let content = self.symbols.to_number(&normalized);
        let address = self.cipher.decrypt(&content);
        debug!("search {:?} -> address with {} bits", normalized.trim_end(), address.bits());
        self.coords.to_coords(&address)
    }

    /// Uniformly random hex among those whose lines never wrap.
    pub fn random_hex<R: Rng + ?Sized>(&self, rng: &mut R) -> HexId {
        HexId::random(rng, &self.coords.hex_count())
    }

    /// Uniformly random purified room whose lines never wrap.
    ///
    /// Seeds are drawn below `⌊hex_count / PURIFIED_PERIOD⌋ · PURIFIED_SPAN`,
    /// so [`purified_hex`](landmarks::purified_hex) stays below `hex_count`.
    pub fn random_purified_hex<R: Rng + ?Sized>(&self, rng: &mut R) -> HexId {
        let periods = self.coords.hex_count() / landmarks::PURIFIED_PERIOD;
        let bound = periods * landmarks::PURIFIED_SPAN;
        landmarks::purified_hex(HexId::random(rng, &bound).as_biguint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundKeyConfig;
    use num_traits::Zero;

    fn library() -> Library {
        Library::reference().unwrap()
    }

    fn padded(s: &str) -> String {
        format!("{:<80}", s)
    }

    #[test]
    fn test_reference_builds() {
        let lib = library();
        assert_eq!(lib.line_length(), 80);
        assert_eq!(lib.modulus(), &BigUint::from(29u32).pow(80));
        assert_eq!(lib.layout().lines_per_hex(), 10_496_000);
    }

    #[test]
    fn test_non_invertible_round_rejected() {
        let mut config = LibraryConfig::reference();
        config.rounds[2] = RoundKeyConfig::new("58", "1");
        let err = Library::new(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Arithmetic { round: 2, .. }));
    }

    #[test]
    fn test_alphabet_size_drives_modulus() {
        let mut config = LibraryConfig::reference();
        config.alphabet = "0123456789abcdefghijklmnopqrstuvwxyz".into();
        // The first reference multiplier is even, so it has no inverse modulo 36^80.
        assert!(Library::new(&config).is_err());
    }

    #[test]
    fn test_first_line_golden() {
        let lib = library();
        let page = lib.generate_page(&PageRef::new(0u64, 0, 0, 0, 0)).unwrap();
        assert_eq!(page.len(), 40);
        assert_eq!(
            page[0],
            "dehxvpp,az.,rcyvrxtgzkyvbiczzkobzrzimyykpezxdrljnxrbklxweofpzbhvm,f,yuatgkgak.li"
        );
        assert!(page.iter().all(|l| l.chars().count() == 80));
    }

    #[test]
    fn test_hello_world() {
        let lib = library();
        let found = lib.search("hello world");
        assert_eq!(
            found.hex.as_biguint().to_string(),
            "24337523436756139460818663747263102158517891634685812505286695430244582082479567608335093511538708872349920638"
        );
        assert_eq!(
            (found.wall, found.shelf, found.volume, found.page, found.line),
            (0, 3, 25, 249, 5)
        );

        let page = lib.generate_page(&found.page_ref()).unwrap();
        assert_eq!(page[found.line as usize], padded("hello world"));
    }

    #[test]
    fn test_search_normalizes_source_text() {
        let lib = library();
        assert_eq!(lib.search("Hello, World!"), lib.search("hello, world"));
        assert_eq!(lib.search("it's"), lib.search("its"));
    }

    #[test]
    fn test_empty_search_is_spaces() {
        let lib = library();
        let found = lib.search("");
        assert_eq!(lib.line(&found).unwrap(), padded(""));
        assert_eq!(found, lib.search("?!#"));
        assert_eq!(lib.encrypt(&lib.coords_to_address(&found).unwrap()), BigUint::zero());
    }

    #[test]
    fn test_long_search_truncated() {
        let lib = library();
        let text = "a".repeat(100);
        let found = lib.search(&text);
        assert_eq!(lib.line(&found).unwrap(), "a".repeat(80));
    }

    #[test]
    fn test_generate_page_rejects_bad_coords() {
        let lib = library();
        assert!(lib.generate_page(&PageRef::new(0u64, 4, 0, 0, 0)).is_err());
        assert!(lib.generate_page(&PageRef::new(0u64, 0, 5, 0, 0)).is_err());
        assert!(lib.generate_page(&PageRef::new(0u64, 0, 0, 32, 0)).is_err());
        assert!(lib.generate_page(&PageRef::new(0u64, 0, 0, 0, 410)).is_err());
    }

    #[test]
    fn test_read_page_catalog() {
        let lib = library();
        let view = lib.read_page(&landmarks::catalog_page()).unwrap();
        assert!(view.catalog);
        assert!(view.lines[0].starts_with("this volume contains"));
        assert_eq!(view.lines.len(), 40);

        let next = landmarks::catalog_page().next_page(lib.layout()).unwrap();
        let view = lib.read_page(&next).unwrap();
        assert!(!view.catalog);
        assert_eq!(view.lines, lib.generate_page(&next).unwrap());
    }

    #[test]
    fn test_read_page_room_and_clue() {
        let lib = library();
        let view = lib.read_page(&PageRef::new(0u64, 0, 0, 0, 0)).unwrap();
        assert_eq!(view.room, RoomKind::Purified);
        assert!(view.clue.is_none());

        // Page 2 of hex 0 starts at address 80, inside every trigger window.
        let view = lib.read_page(&PageRef::new(0u64, 0, 0, 0, 2)).unwrap();
        assert_eq!(view.clue.map(|c| c.index), Some(0));
    }

    #[test]
    fn test_random_hex_reads() {
        use rand::SeedableRng;
        let lib = library();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let hex = lib.random_hex(&mut rng);
        let coords = PageRef::new(hex, 3, 4, 31, 409).line(39);
        let addr = lib.coords_to_address(&coords).unwrap();
        assert_eq!(lib.address_to_coords(&addr), coords);
    }

    #[test]
    fn test_read_page_purifier_quote() {
        let lib = library();
        let view = lib.read_page(&PageRef::new(7u64, 0, 0, 0, 0)).unwrap();
        assert_eq!(view.room, RoomKind::Purified);
        assert_eq!(view.purifier_quote, Some(landmarks::purifier_quote(&HexId::from(7u64))));

        let view = lib.read_page(&PageRef::new(5_000u64, 0, 0, 0, 0)).unwrap();
        assert_eq!(view.room, RoomKind::Ordinary);
        assert!(view.purifier_quote.is_none());
    }

    #[test]
    fn test_random_purified_hex_reads() {
        use rand::SeedableRng;
        let lib = library();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let hex_count = lib.coordinates().hex_count();

        for _ in 0..100 {
            let hex = lib.random_purified_hex(&mut rng);
            assert_ne!(RoomKind::of(&hex), RoomKind::Ordinary);
            assert!(hex.as_biguint() < &hex_count);

            let coords = PageRef::new(hex, 3, 4, 31, 409).line(39);
            let addr = lib.coords_to_address(&coords).unwrap();
            assert_eq!(lib.address_to_coords(&addr), coords);
        }
    }

    #[test]
    fn test_library_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Library>();
    }
}
