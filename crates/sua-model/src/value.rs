//! Typed field values extracted from fixed-width lines.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Semantic type of a fixed-width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text, possibly space-padded.
    Text,
    /// Zero-padded fixed-width integer.
    Integer,
    /// Eight-digit `YYYYMMDD` calendar date.
    Date,
    /// Fixed-width integer-cents monetary amount.
    Currency,
    /// Single-character boolean flag.
    Flag,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Date => "date",
            FieldType::Currency => "currency",
            FieldType::Flag => "flag",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An extracted field value.
///
/// `Unparsed` is deliberately distinct from both `Empty` and a valid zero:
/// a numeric field whose payload is not numeric stays observable to rules
/// instead of being silently coerced.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Field absent or blank after trimming.
    Empty,
    Text(String),
    Integer(i64),
    Amount(Money),
    Date(NaiveDate),
    Flag(bool),
    /// Payload present but not parseable under the declared type.
    Unparsed(String),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, FieldValue::Unparsed(_))
    }

    /// Text rendering used for comparisons declared as text and for
    /// violation reporting.
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) | FieldValue::Unparsed(s) => s.clone(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Amount(m) => m.amount().to_string(),
            FieldValue::Date(d) => d.format("%Y%m%d").to_string(),
            FieldValue::Flag(true) => "1".to_string(),
            FieldValue::Flag(false) => "0".to_string(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view: integers widen to decimals, amounts expose their value.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Integer(n) => Some(Decimal::from(*n)),
            FieldValue::Amount(m) => Some(m.amount()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn unparsed_is_not_zero() {
        let unparsed = FieldValue::Unparsed("00O123".to_string());
        assert!(unparsed.is_unparsed());
        assert_eq!(unparsed.as_integer(), None);
        assert_ne!(unparsed, FieldValue::Integer(0));
    }

    #[test]
    fn decimal_view_widens_integers() {
        assert_eq!(
            FieldValue::Integer(42).as_decimal(),
            Some(Decimal::from(42))
        );
        let amount = FieldValue::Amount(Money::from_cents(1250, Currency::Mxn));
        assert_eq!(amount.as_decimal(), Some(Decimal::new(1250, 2)));
    }

    #[test]
    fn text_rendering() {
        assert_eq!(FieldValue::Empty.as_text(), "");
        assert_eq!(FieldValue::Flag(true).as_text(), "1");
        let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(date.as_text(), "20240115");
    }
}
