//! Schema-driven extraction of typed fields from fixed-width lines.
//!
//! Parsing is a pure function of line plus schema: malformed input never
//! raises an error, it produces a [`ParsedRecord`] carrying structural or
//! field-level violations. Only schema invariant violations (checked at
//! schema load) are fatal, and they never reach this crate.

mod parser;

pub use parser::{
    FLD_DATE, FLD_ENUM, FLD_FLAG, FLD_NUMERIC, FLD_PATTERN, FLD_REQUIRED, OverlengthPolicy,
    ParseOptions, STR_LINE_LENGTH, STR_RECORD_TYPE, parse_line,
};
