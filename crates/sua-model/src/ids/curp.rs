//! CURP: the 18-character population registry key.
//!
//! Layout: four name letters, six-digit birth date (`YYMMDD`), sex marker,
//! two-letter federal-entity code, three internal consonants, one
//! homoclave character, and a trailing check digit. The century of the
//! embedded date is carried by position 17: a digit means a 1900s birth,
//! a letter a 2000s birth.

use std::fmt;

use chrono::NaiveDate;

use super::{IdError, is_vowel};

/// Base-37 alphabet used by the registry's check-digit algorithm.
const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNÑOPQRSTUVWXYZ";

/// Federal-entity codes: the 32 states plus NE for persons born abroad.
const STATE_CODES: &[&str] = &[
    "AS", "BC", "BS", "CC", "CH", "CL", "CM", "CS", "DF", "DG", "GR", "GT", "HG", "JC", "MC", "MN",
    "MS", "NE", "NL", "NT", "OC", "PL", "QR", "QT", "SL", "SP", "SR", "TC", "TL", "TS", "VZ", "YN",
    "ZS",
];

/// Four-letter prefixes the registry never assigns verbatim; an issued key
/// containing one would have had its second letter substituted.
const INCONVENIENT_PREFIXES: &[&str] = &[
    "BACA", "BAKA", "BUEI", "BUEY", "CACA", "CACO", "CAGA", "CAGO", "CAKA", "CAKO", "COGE", "COGI",
    "COJA", "COJE", "COJI", "COJO", "COLA", "CULO", "FALO", "FETO", "GETA", "GUEI", "GUEY", "JETA",
    "JOTO", "KACA", "KACO", "KAGA", "KAGO", "KAKA", "KAKO", "KOGE", "KOGI", "KOJA", "KOJE", "KOJI",
    "KOJO", "KOLA", "KULO", "LILO", "LOCA", "LOCO", "LOKA", "LOKO", "MAME", "MAMO", "MEAR", "MEAS",
    "MEON", "MIAR", "MION", "MOCO", "MOKO", "MULA", "MULO", "NACA", "NACO", "PEDA", "PEDO", "PENE",
    "PIPI", "PITO", "POPO", "PUTA", "PUTO", "QULO", "RATA", "ROBA", "ROBE", "ROBO", "RUIN", "SENO",
    "TETA", "VACA", "VAGA", "VAGO", "VAKA", "VUEI", "VUEY", "WUEI", "WUEY",
];

/// A validated population registry key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Curp(String);

impl Curp {
    pub const LENGTH: usize = 18;

    /// Validate and construct, without an upper bound on the birth date.
    pub fn create(raw: &str) -> Result<Self, IdError> {
        let normalized = normalize(raw);
        validate(&normalized, None)?;
        Ok(Self(normalized))
    }

    /// Validate and construct; the embedded birth date must not lie after
    /// `as_of` (the evaluation date).
    pub fn create_as_of(raw: &str, as_of: NaiveDate) -> Result<Self, IdError> {
        let normalized = normalize(raw);
        validate(&normalized, Some(as_of))?;
        Ok(Self(normalized))
    }

    /// Non-throwing screen for high-volume batch checks.
    pub fn is_valid(raw: &str) -> bool {
        validate(&normalize(raw), None).is_ok()
    }

    pub fn is_valid_as_of(raw: &str, as_of: NaiveDate) -> bool {
        validate(&normalize(raw), Some(as_of)).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The embedded birth date. Infallible after validation.
    pub fn birth_date(&self) -> NaiveDate {
        let chars: Vec<char> = self.0.chars().collect();
        embedded_birth_date(&chars).expect("validated at construction")
    }

    /// Sex marker: `H`, `M` or `X`.
    pub fn sex(&self) -> char {
        self.0.chars().nth(10).expect("validated at construction")
    }

    /// Two-letter federal-entity code.
    pub fn state_code(&self) -> &str {
        &self.0[11..13]
    }

    /// Human display form with conventional grouping.
    pub fn formatted(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            &self.0[0..4],
            &self.0[4..10],
            &self.0[10..16],
            &self.0[16..18]
        )
    }
}

impl fmt::Display for Curp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn validate(s: &str, as_of: Option<NaiveDate>) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != Curp::LENGTH {
        return Err(IdError::WrongLength {
            expected: Curp::LENGTH,
            actual: chars.len(),
        });
    }

    // Character classes, position by position.
    if !chars[0].is_ascii_uppercase() {
        return Err(IdError::Malformed("position 1 must be a letter".into()));
    }
    if !is_vowel(chars[1]) {
        return Err(IdError::Malformed("position 2 must be a vowel".into()));
    }
    if !chars[2..4].iter().all(char::is_ascii_uppercase) {
        return Err(IdError::Malformed("positions 3-4 must be letters".into()));
    }
    if !chars[4..10].iter().all(char::is_ascii_digit) {
        return Err(IdError::Malformed(
            "positions 5-10 must be the birth date digits".into(),
        ));
    }
    if !matches!(chars[10], 'H' | 'M' | 'X') {
        return Err(IdError::InvalidComponent {
            component: "sex marker",
            value: chars[10].to_string(),
        });
    }
    if !chars[11..13].iter().all(char::is_ascii_uppercase) {
        return Err(IdError::Malformed("positions 12-13 must be letters".into()));
    }
    if !chars[13..16]
        .iter()
        .all(|c| c.is_ascii_uppercase() && !is_vowel(*c))
    {
        return Err(IdError::Malformed(
            "positions 14-16 must be consonants".into(),
        ));
    }
    if !chars[16].is_ascii_alphanumeric() {
        return Err(IdError::Malformed(
            "position 17 must be a letter or digit".into(),
        ));
    }
    if !chars[17].is_ascii_digit() {
        return Err(IdError::Malformed("position 18 must be a digit".into()));
    }

    // Embedded components.
    let prefix: String = chars[0..4].iter().collect();
    if INCONVENIENT_PREFIXES.binary_search(&prefix.as_str()).is_ok() {
        return Err(IdError::InvalidComponent {
            component: "name prefix",
            value: prefix,
        });
    }
    let state: String = chars[11..13].iter().collect();
    if !STATE_CODES.contains(&state.as_str()) {
        return Err(IdError::InvalidComponent {
            component: "state code",
            value: state,
        });
    }
    let birth = embedded_birth_date(&chars).ok_or_else(|| IdError::InvalidComponent {
        component: "birth date",
        value: chars[4..10].iter().collect(),
    })?;
    if let Some(limit) = as_of
        && birth > limit
    {
        return Err(IdError::InvalidComponent {
            component: "birth date",
            value: chars[4..10].iter().collect(),
        });
    }

    // Verification digit, last.
    let expected = check_digit(&chars[0..17]);
    if expected != chars[17] {
        return Err(IdError::CheckDigitMismatch {
            expected,
            found: chars[17],
        });
    }
    Ok(())
}

/// Resolve the six embedded date digits using the century marker at
/// position 17 (digit: 1900s, letter: 2000s).
fn embedded_birth_date(chars: &[char]) -> Option<NaiveDate> {
    let num = |range: std::ops::Range<usize>| -> Option<u32> {
        chars[range].iter().collect::<String>().parse().ok()
    };
    let yy = num(4..6)?;
    let mm = num(6..8)?;
    let dd = num(8..10)?;
    let century = if chars[16].is_ascii_digit() { 1900 } else { 2000 };
    NaiveDate::from_ymd_opt(century + yy as i32, mm, dd)
}

fn char_value(c: char) -> u32 {
    ALPHABET
        .chars()
        .position(|a| a == c)
        .map(|i| i as u32)
        .unwrap_or(0)
}

/// Weighted mod-10 digit over the first seventeen characters
/// (weights 18 down to 2).
fn check_digit(first17: &[char]) -> char {
    let sum: u32 = first17
        .iter()
        .enumerate()
        .map(|(i, c)| char_value(*c) * (18 - i as u32))
        .sum();
    char::from_digit((10 - sum % 10) % 10, 10).expect("mod 10 digit")
}
