//! RFC: the 13-character individual taxpayer key.
//!
//! Layout: four name letters, six-digit date (`YYMMDD`), two-character
//! homoclave, and a trailing verification character computed with the
//! tax authority's mod-11 annex algorithm over a 38-symbol table.

use std::fmt;

use chrono::NaiveDate;

use super::IdError;

/// Four-letter prefixes the authority screens out; an issued key would
/// carry an `X` in place of the offending vowel.
const SCREENED_PREFIXES: &[&str] = &[
    "BUEI", "BUEY", "CACA", "CACO", "CAGA", "CAGO", "CAKA", "COGE", "COJA", "COJE", "COJI", "COJO",
    "CULO", "FETO", "GUEY", "JOTO", "KACA", "KACO", "KAGA", "KAGO", "KAKA", "KOGE", "KOJO", "KULO",
    "MAME", "MAMO", "MEAR", "MEAS", "MEON", "MION", "MOCO", "MULA", "PEDA", "PEDO", "PENE", "PUTA",
    "PUTO", "QULO", "RATA", "RUIN",
];

/// A validated individual taxpayer key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rfc(String);

impl Rfc {
    pub const LENGTH: usize = 13;

    pub fn create(raw: &str) -> Result<Self, IdError> {
        let normalized = normalize(raw);
        validate(&normalized, None)?;
        Ok(Self(normalized))
    }

    /// Validate and construct; the embedded date must not lie after
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

    /// The embedded registration/birth date.
    pub fn embedded_date(&self) -> NaiveDate {
        let chars: Vec<char> = self.0.chars().collect();
        embedded_date(&chars).expect("validated at construction")
    }

    /// Two-character homoclave.
    pub fn homoclave(&self) -> String {
        self.0.chars().skip(10).take(2).collect()
    }

    /// Human display form with conventional grouping.
    pub fn formatted(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        format!(
            "{}-{}-{}",
            chars[0..4].iter().collect::<String>(),
            chars[4..10].iter().collect::<String>(),
            chars[10..13].iter().collect::<String>(),
        )
    }
}

impl fmt::Display for Rfc {
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
    if chars.len() != Rfc::LENGTH {
        return Err(IdError::WrongLength {
            expected: Rfc::LENGTH,
            actual: chars.len(),
        });
    }

    if !chars[0..4]
        .iter()
        .all(|c| c.is_ascii_uppercase() || *c == 'Ñ' || *c == '&')
    {
        return Err(IdError::Malformed("positions 1-4 must be letters".into()));
    }
    if !chars[4..10].iter().all(char::is_ascii_digit) {
        return Err(IdError::Malformed(
            "positions 5-10 must be the date digits".into(),
        ));
    }
    if !chars[10..12]
        .iter()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(IdError::Malformed(
            "positions 11-12 must be the homoclave".into(),
        ));
    }
    if !(chars[12].is_ascii_digit() || chars[12] == 'A') {
        return Err(IdError::Malformed(
            "position 13 must be the verification character".into(),
        ));
    }

    let prefix: String = chars[0..4].iter().collect();
    if SCREENED_PREFIXES.binary_search(&prefix.as_str()).is_ok() {
        return Err(IdError::InvalidComponent {
            component: "name prefix",
            value: prefix,
        });
    }
    let date = embedded_date(&chars).ok_or_else(|| IdError::InvalidComponent {
        component: "embedded date",
        value: chars[4..10].iter().collect(),
    })?;
    if let Some(limit) = as_of
        && date > limit
    {
        return Err(IdError::InvalidComponent {
            component: "embedded date",
            value: chars[4..10].iter().collect(),
        });
    }

    let expected = verification_char(&chars[0..12]);
    if expected != chars[12] {
        return Err(IdError::CheckDigitMismatch {
            expected,
            found: chars[12],
        });
    }
    Ok(())
}

/// Resolve the six embedded date digits with a fixed two-digit pivot:
/// years 00-29 read as 2000s, 30-99 as 1900s.
fn embedded_date(chars: &[char]) -> Option<NaiveDate> {
    let num = |range: std::ops::Range<usize>| -> Option<u32> {
        chars[range].iter().collect::<String>().parse().ok()
    };
    let yy = num(4..6)?;
    let mm = num(6..8)?;
    let dd = num(8..10)?;
    let year = if yy <= 29 { 2000 + yy } else { 1900 + yy };
    NaiveDate::from_ymd_opt(year as i32, mm, dd)
}

/// Character values per the published annex table.
fn char_value(c: char) -> u32 {
    match c {
        '0'..='9' => c as u32 - '0' as u32,
        'A'..='N' => 10 + (c as u32 - 'A' as u32),
        '&' => 24,
        'O'..='Z' => 25 + (c as u32 - 'O' as u32),
        ' ' => 37,
        'Ñ' => 38,
        _ => 0,
    }
}

/// Mod-11 verification character over the first twelve characters
/// (weights 13 down to 2); remainder 0 maps to `0`, 1 to `A`.
fn verification_char(first12: &[char]) -> char {
    let sum: u32 = first12
        .iter()
        .enumerate()
        .map(|(i, c)| char_value(*c) * (13 - i as u32))
        .sum();
    match sum % 11 {
        0 => '0',
        1 => 'A',
        rem => char::from_digit(11 - rem, 10).expect("mod 11 digit"),
    }
}
