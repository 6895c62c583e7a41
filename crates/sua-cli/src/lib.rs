//! CLI library components for the regulatory file validator.

pub mod logging;
