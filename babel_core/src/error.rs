//! Error types for the Babel core.

use thiserror::Error;

/// Failures of the number-theoretic helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    /// `gcd(value, modulus) != 1`, so no inverse exists
    #[error("{value} has no inverse modulo {modulus}")]
    NotInvertible { value: String, modulus: String },

    /// Reduction modulo zero is undefined
    #[error("modulus must be non-zero")]
    ZeroModulus,
}

/// Errors raised while validating a [`LibraryConfig`](crate::LibraryConfig).
///
/// Every variant is fatal: a library that fails validation is never built,
/// so no request path can observe one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Alphabet must hold between 2 and 256 distinct symbols
    #[error("alphabet has {0} symbols, expected 2..=256")]
    AlphabetSize(usize),

    /// A symbol appears twice in the alphabet
    #[error("duplicate symbol {0:?} in alphabet")]
    DuplicateSymbol(char),

    /// Line length must be positive
    #[error("line length must be positive")]
    EmptyLine,

    /// Permutation table length differs from the line length
    #[error("permutation has {actual} entries, expected {expected}")]
    PermutationLength { expected: usize, actual: usize },

    /// Permutation table is not a bijection on `0..len`
    #[error("permutation is not a bijection: position {0} is missing or repeated")]
    PermutationNotBijective(usize),

    /// Wrong number of cipher rounds
    #[error("expected {expected} round keys, found {actual}")]
    RoundCount { expected: usize, actual: usize },

    /// A round key component is not a decimal integer
    #[error("round {round}: invalid {component} {value:?}")]
    InvalidRoundKey {
        round: usize,
        component: &'static str,
        value: String,
    },

    /// A round multiplier is not invertible modulo the address space
    #[error("round {round}: {source}")]
    Arithmetic {
        round: usize,
        #[source]
        source: ArithmeticError,
    },

    /// A layout radix is zero
    #[error("layout radix for {0} must be positive")]
    ZeroRadix(&'static str),

    /// The layout addresses more lines per hex than fit in a u64 or in the space
    #[error("layout of {0} lines per hex does not fit the address space")]
    LayoutTooLarge(String),

    /// Reading the configuration file failed
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for a `LibraryConfig`
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A coordinate field is outside `[0, radix)`; never wrapped
    #[error("{field} {value} out of range (must be below {radix})")]
    FieldOutOfRange {
        field: &'static str,
        value: u32,
        radix: u32,
    },

    /// Text is neither hexadecimal nor base 36
    #[error("invalid hex id: {0:?}")]
    InvalidHexId(String),
}

impl ValidationError {
    /// Creates an out-of-range error.
    pub fn out_of_range(field: &'static str, value: u32, radix: u32) -> Self {
        Self::FieldOutOfRange { field, value, radix }
    }
}
