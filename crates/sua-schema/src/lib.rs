mod builtin;
pub mod error;
pub mod field;
pub mod file;
pub mod loader;
pub mod record;
pub mod rules;

pub use error::SchemaError;
pub use field::FieldDefinition;
pub use file::{AggregateKind, AggregateSpec, FileSchema, FileType, SchemaRegistry};
pub use loader::{RuleLoadError, load_rules_json, parse_rules_json, validate_rules};
pub use record::{RecordKind, RecordSchema};
pub use rules::{
    ActionKind, ComparisonOp, ConditionNode, DataType, LogicalOp, Operand, RuleAction,
    ValidatorRule,
};
