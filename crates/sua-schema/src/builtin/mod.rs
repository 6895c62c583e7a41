//! Built-in declarative schema tables, one module per regulated file type.
//!
//! These tables are the process-start source of every `FileSchema`; they
//! are data expressed as code, and any invariant violation inside them
//! surfaces as a `SchemaError` the moment the registry loads.

mod contribution;
mod dispersion;
mod worker;

pub(crate) use contribution::payroll_contribution;
pub(crate) use dispersion::bank_dispersion;
pub(crate) use worker::worker_registry;
