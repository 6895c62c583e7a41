//! Monetary amounts bound to a currency.
//!
//! Amounts are decimals rounded to two fraction digits with round-half-to-
//! even, matching how the regulator settles sub-cent values. The wire form
//! is a fixed-width, zero-padded integer-cents string with no separators.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Currencies accepted in regulated file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Mxn,
    Usd,
}

impl Currency {
    /// ISO 4217 alpha code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Mxn => "MXN",
            Currency::Usd => "USD",
        }
    }

    /// Parse an ISO 4217 alpha code (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MXN" => Some(Currency::Mxn),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A decimal amount in a single currency, always at two fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Build an amount, rounding to two fraction digits half-to-even.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
            currency,
        }
    }

    /// Build an amount from integer cents.
    pub fn from_cents(cents: i64, currency: Currency) -> Self {
        Self {
            amount: Decimal::new(cents, 2),
            currency,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::from_cents(0, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The amount in integer cents.
    pub fn cents(&self) -> i64 {
        // Exact: the two-fraction-digit invariant holds from construction.
        (self.amount * Decimal::from(100))
            .round()
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Add two amounts of the same currency.
    pub fn checked_add(self, rhs: Money) -> Result<Money, ModelError> {
        self.same_currency(rhs)?;
        Ok(Money::new(self.amount + rhs.amount, self.currency))
    }

    /// Subtract two amounts of the same currency.
    pub fn checked_sub(self, rhs: Money) -> Result<Money, ModelError> {
        self.same_currency(rhs)?;
        Ok(Money::new(self.amount - rhs.amount, self.currency))
    }

    fn same_currency(&self, rhs: Money) -> Result<(), ModelError> {
        if self.currency != rhs.currency {
            return Err(ModelError::CurrencyMismatch {
                left: self.currency.code(),
                right: rhs.currency.code(),
            });
        }
        Ok(())
    }

    /// Encode as the regulator's fixed-width integer-cents form.
    ///
    /// Produces exactly `width` ASCII digits, zero-padded, no separators.
    /// Negative amounts and amounts that need more than `width` digits
    /// cannot be represented.
    pub fn encode_cents(&self, width: usize) -> Result<String, ModelError> {
        let cents = self.cents();
        if cents < 0 {
            return Err(ModelError::NegativeAmount {
                amount: self.to_string(),
            });
        }
        let digits = cents.to_string();
        if digits.len() > width {
            return Err(ModelError::AmountOverflow {
                amount: self.to_string(),
                width,
            });
        }
        Ok(format!("{digits:0>width$}"))
    }

    /// Decode a fixed-width integer-cents payload.
    pub fn decode_cents(raw: &str, currency: Currency) -> Result<Money, ModelError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ModelError::MalformedAmount {
                value: raw.to_string(),
            });
        }
        let cents: i64 = raw.parse().map_err(|_| ModelError::AmountOverflow {
            amount: raw.to_string(),
            width: raw.len(),
        })?;
        Ok(Money::from_cents(cents, currency))
    }
}

impl PartialOrd for Money {
    /// Ordering is only defined within one currency.
    fn partial_cmp(&self, other: &Money) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        self.amount.partial_cmp(&other.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
