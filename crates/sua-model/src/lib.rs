pub mod dates;
pub mod error;
pub mod ids;
pub mod money;
pub mod record;
pub mod value;

pub use dates::{DateError, parse_fixed_date, parse_fixed_date_not_after};
pub use error::ModelError;
pub use ids::{Clabe, Curp, IdError, Nss, Rfc};
pub use money::{Currency, Money};
pub use record::{ParsedRecord, Severity, Violation, ViolationKind};
pub use value::{FieldType, FieldValue};
