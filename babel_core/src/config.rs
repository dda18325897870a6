//! Library configuration: alphabet, layout, round keys, digit permutation.
//!
//! The default value is the reference configuration. Coordinates found with
//! one configuration are meaningless under another, so deviate only for
//! experiments. A config is checked once by [`Library::new`](crate::Library::new).

use crate::cipher::{ROUND_COUNT, REFERENCE_ROUND_KEYS};
use crate::coords::Layout;
use crate::digits::REFERENCE_PERMUTATION;
use crate::error::ConfigError;
use crate::symbols::REFERENCE_ALPHABET;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One round key as decimal strings (the values exceed every fixed-width integer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundKeyConfig {
    pub multiplier: String,
    pub increment: String,
}

impl RoundKeyConfig {
    pub fn new(multiplier: impl Into<String>, increment: impl Into<String>) -> Self {
        Self {
            multiplier: multiplier.into(),
            increment: increment.into(),
        }
    }

    /// Parses both components; `round` is only used in the error.
    pub(crate) fn parse(&self, round: usize) -> Result<(BigUint, BigUint), ConfigError> {
        let parse = |component: &'static str, value: &str| {
            value
                .trim()
                .parse::<BigUint>()
                .map_err(|_| ConfigError::InvalidRoundKey {
                    round,
                    component,
                    value: value.to_string(),
                })
        };
        Ok((
            parse("multiplier", &self.multiplier)?,
            parse("increment", &self.increment)?,
        ))
    }
}

/// Immutable library configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Symbols in digit order; digit 0 pads search text
    pub alphabet: String,

    /// Symbols per line; the address space is `alphabet.len() ^ line_length`
    pub line_length: usize,

    /// Walls, shelves, volumes, pages and lines per room
    pub layout: Layout,

    /// Exactly [`ROUND_COUNT`] affine round keys
    pub rounds: Vec<RoundKeyConfig>,

    /// Digit permutation, `line_length` entries
    pub permutation: Vec<usize>,
}

impl LibraryConfig {
    /// The reference configuration.
    pub fn reference() -> Self {
        Self {
            alphabet: REFERENCE_ALPHABET.to_string(),
            line_length: REFERENCE_PERMUTATION.len(),
            layout: Layout::REFERENCE,
            rounds: REFERENCE_ROUND_KEYS
                .iter()
                .map(|(a, b)| RoundKeyConfig::new(*a, *b))
                .collect(),
            permutation: REFERENCE_PERMUTATION.to_vec(),
        }
    }

    /// Parses a JSON config. Missing fields take their reference values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks the shape of the config (not the arithmetic, which needs `N`).
    pub(crate) fn check_shape(&self) -> Result<(), ConfigError> {
        if self.line_length == 0 {
            return Err(ConfigError::EmptyLine);
        }
        if self.permutation.len() != self.line_length {
            return Err(ConfigError::PermutationLength {
                expected: self.line_length,
                actual: self.permutation.len(),
            });
        }
        if self.rounds.len() != ROUND_COUNT {
            return Err(ConfigError::RoundCount {
                expected: ROUND_COUNT,
                actual: self.rounds.len(),
            });
        }
        Ok(())
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_shape() {
        let config = LibraryConfig::reference();
        assert_eq!(config.alphabet.chars().count(), 29);
        assert_eq!(config.line_length, 80);
        assert_eq!(config.rounds.len(), 4);
        assert!(config.check_shape().is_ok());
    }

    #[test]
    fn test_json_defaults() {
        let config = LibraryConfig::from_json("{}").unwrap();
        assert_eq!(config, LibraryConfig::reference());

        let config = LibraryConfig::from_json(r#"{"layout": {"walls": 6, "shelves": 5, "volumes": 32, "pages": 410, "lines": 40}}"#).unwrap();
        assert_eq!(config.layout.walls, 6);
        assert_eq!(config.alphabet, REFERENCE_ALPHABET);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = LibraryConfig::reference();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LibraryConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(LibraryConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_shape_errors() {
        let mut config = LibraryConfig::reference();
        config.rounds.pop();
        assert!(matches!(
            config.check_shape(),
            Err(ConfigError::RoundCount { expected: 4, actual: 3 })
        ));

        let mut config = LibraryConfig::reference();
        config.permutation.pop();
        assert!(matches!(
            config.check_shape(),
            Err(ConfigError::PermutationLength { expected: 80, actual: 79 })
        ));
    }

    #[test]
    fn test_round_key_parse() {
        let key = RoundKeyConfig::new("12", "x7");
        assert!(matches!(
            key.parse(2),
            Err(ConfigError::InvalidRoundKey { round: 2, component: "increment", .. })
        ));
        let key = RoundKeyConfig::new(" 12 ", "7");
        assert_eq!(key.parse(0).unwrap(), (BigUint::from(12u32), BigUint::from(7u32)));
    }
}
