//! Checksum-validated identifier types.
//!
//! Each identifier is an immutable fixed-length string with a
//! verification digit computed by a deterministic weighting algorithm:
//!
//! - [`Curp`]: 18-character population registry key (embedded birth date,
//!   sex, federal-entity code, mod-10 check digit over a 37-symbol base).
//! - [`Rfc`]: 13-character taxpayer key (embedded date, homoclave,
//!   mod-11 verification character per the SAT annex).
//! - [`Nss`]: 11-digit social security number (Luhn check digit).
//! - [`Clabe`]: 18-digit standardized bank account number (3-7-1
//!   weighted mod-10 control digit).
//!
//! Checks run cheapest-first: emptiness, exact length, character classes,
//! embedded components, and the verification digit last. `is_valid`
//! short-circuits on the first failing check and never allocates the
//! final instance.

mod clabe;
mod curp;
mod nss;
mod rfc;

pub use clabe::Clabe;
pub use curp::Curp;
pub use nss::Nss;
pub use rfc::Rfc;

use thiserror::Error;

/// Typed reasons an identifier fails to validate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("value is empty")]
    Empty,

    #[error("wrong length: expected {expected}, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("malformed: {0}")]
    Malformed(String),

    #[error("invalid {component}: {value:?}")]
    InvalidComponent {
        component: &'static str,
        value: String,
    },

    #[error("check digit mismatch: expected {expected}, found {found}")]
    CheckDigitMismatch { expected: char, found: char },
}

/// Trim and strip interior separators (spaces, hyphens) where the format
/// allows them on input.
pub(crate) fn compact(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

pub(crate) fn is_vowel(c: char) -> bool {
    matches!(c, 'A' | 'E' | 'I' | 'O' | 'U')
}
