use thiserror::Error;

/// Errors raised when constructing or combining model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Arithmetic between two amounts in different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// A monetary payload that is not a pure digit string.
    #[error("malformed amount field: {value:?}")]
    MalformedAmount { value: String },

    /// Amount does not fit the fixed-width cents encoding.
    #[error("amount {amount} does not fit in {width} digits")]
    AmountOverflow { amount: String, width: usize },

    /// The fixed-width cents encoding only covers non-negative amounts.
    #[error("cannot encode negative amount {amount}")]
    NegativeAmount { amount: String },
}
