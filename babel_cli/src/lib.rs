//! Babel CLI support: self-checks behind `babel verify`.

pub mod checks;

pub use checks::{CheckId, CheckResult, CheckRunner};
