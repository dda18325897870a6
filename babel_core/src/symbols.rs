//! Symbol codec: text over the library alphabet <-> base-N integers.

use crate::arith::{from_digits, to_digits};
use crate::error::ConfigError;
use num_bigint::BigUint;
use std::collections::HashMap;

/// The 29 reference symbols. Index 0 (space) doubles as the padding symbol.
pub const REFERENCE_ALPHABET: &str = " ,.abcdefghijklmnopqrstuvwxyz";

/// Bijection between fixed-length strings over an alphabet and integers.
///
/// Symbol `i` of the alphabet is digit `i`; the first character of a string is
/// its most significant digit.
#[derive(Debug, Clone)]
pub struct SymbolCodec {
    symbols: Vec<char>,
    index: HashMap<char, u8>,
}

impl SymbolCodec {
    /// Builds a codec, rejecting duplicate symbols and sizes outside 2..=256.
    pub fn new(alphabet: &str) -> Result<Self, ConfigError> {
        let symbols: Vec<char> = alphabet.chars().collect();
        if !(2..=256).contains(&symbols.len()) {
            return Err(ConfigError::AlphabetSize(symbols.len()));
        }

        let mut index = HashMap::with_capacity(symbols.len());
        for (digit, &c) in symbols.iter().enumerate() {
            if index.insert(c, digit as u8).is_some() {
                return Err(ConfigError::DuplicateSymbol(c));
            }
        }

        Ok(Self { symbols, index })
    }

    /// Number of symbols, i.e. the positional base.
    pub fn base(&self) -> u32 {
        self.symbols.len() as u32
    }

    /// Symbols in digit order.
    pub fn alphabet(&self) -> &[char] {
        &self.symbols
    }

    /// The symbol for digit 0, used to pad short search strings.
    pub fn pad_symbol(&self) -> char {
        self.symbols[0]
    }

    pub fn contains(&self, c: char) -> bool {
        self.index.contains_key(&c)
    }

    /// Encodes `text` as a base-N integer, most significant symbol first.
    ///
    /// Characters outside the alphabet are skipped without consuming a digit
    /// position, so `"it's"` encodes exactly like `"its"`. Everything after a
    /// skipped character shifts one place toward the least significant end.
    pub fn to_number(&self, text: &str) -> BigUint {
        let digits: Vec<u8> = text
            .chars()
            .filter_map(|c| self.index.get(&c).copied())
            .collect();
        from_digits(&digits, self.base())
    }

    /// Renders the low `length` base-N digits of `num` as symbols.
    pub fn to_symbols(&self, num: &BigUint, length: usize) -> String {
        to_digits(num, self.base(), length)
            .into_iter()
            .map(|d| self.symbols[d as usize])
            .collect()
    }

    /// Prepares free text for search.
    ///
    /// Lowercases, removes every character outside the alphabet from the
    /// source string, then pads with [`pad_symbol`](Self::pad_symbol) or
    /// truncates to exactly `length` symbols. This filter runs before
    /// [`to_number`](Self::to_number), which then never meets a foreign
    /// character. Text with no valid characters becomes all padding.
    pub fn normalize(&self, text: &str, length: usize) -> String {
        text.to_lowercase()
            .chars()
            .filter(|c| self.contains(*c))
            .chain(std::iter::repeat(self.pad_symbol()))
            .take(length)
            .collect()
    }
}
