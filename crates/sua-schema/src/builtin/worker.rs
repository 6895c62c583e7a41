//! Worker affiliation movements file: 77-character lines, record types
//! 01 (employer header), 02 (worker detail) and 09 (count footer).

use sua_model::{Currency, FieldType};

use crate::error::SchemaError;
use crate::field::FieldDefinition;
use crate::file::{AggregateSpec, FileSchema, FileType};
use crate::record::{RecordKind, RecordSchema};
use crate::rules::{ComparisonOp, ConditionNode, DataType, Operand, RuleAction, ValidatorRule};

const LINE_LENGTH: usize = 77;

pub(crate) fn worker_registry() -> Result<FileSchema, SchemaError> {
    FileSchema::new(
        FileType::WorkerRegistry,
        "worker affiliation movements",
        Currency::Mxn,
        (1, 2),
        vec![header()?, detail()?, footer()?],
        vec![AggregateSpec::count("detail_count", "02")],
        rules(),
    )
}

fn header() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "01",
        RecordKind::Header,
        LINE_LENGTH,
        vec![
            FieldDefinition::new("record_type", "Record type", 1, 2, FieldType::Text).required(),
            FieldDefinition::new("employer_registry", "Employer registry number", 3, 13, FieldType::Text)
                .required()
                .with_pattern(r"^[A-Z0-9][0-9]{10}$")?,
            FieldDefinition::new("transmission_date", "Transmission date", 14, 21, FieldType::Date)
                .required()
                .reject_future(),
            FieldDefinition::new("filler", "Reserved", 22, 77, FieldType::Text),
        ],
    )
}

fn detail() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "02",
        RecordKind::Detail,
        LINE_LENGTH,
        vec![
            FieldDefinition::new("record_type", "Record type", 1, 2, FieldType::Text).required(),
            FieldDefinition::new("curp", "Population registry key", 3, 20, FieldType::Text)
                .required(),
            FieldDefinition::new("nss", "Social security number", 21, 31, FieldType::Text)
                .required()
                .with_pattern(r"^[0-9]{11}$")?,
            FieldDefinition::new("hire_date", "Hire date", 32, 39, FieldType::Date)
                .required()
                .reject_future(),
            // The legacy feed spells active/terminated both numerically and
            // with letter codes; both map to one canonical value.
            FieldDefinition::new("worker_status", "Worker status", 40, 41, FieldType::Text)
                .required()
                .with_allowed(&[
                    ("01", "01"),
                    ("AC", "01"),
                    ("02", "02"),
                    ("BA", "02"),
                    ("03", "03"),
                ]),
            FieldDefinition::new("base_wage", "Base contribution wage", 42, 50, FieldType::Currency)
                .required()
                .padded('0'),
            FieldDefinition::new("worker_name", "Worker name", 51, 77, FieldType::Text).required(),
        ],
    )
}

fn footer() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "09",
        RecordKind::Footer,
        LINE_LENGTH,
        vec![
            FieldDefinition::new("record_type", "Record type", 1, 2, FieldType::Text).required(),
            FieldDefinition::new("detail_count", "Declared movement count", 3, 8, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new("filler", "Reserved", 9, 77, FieldType::Text),
        ],
    )
}

fn rules() -> Vec<ValidatorRule> {
    vec![
        ValidatorRule::new(
            "RT-001",
            "Worker CURP verification digit",
            &["02"],
            10,
            ConditionNode::leaf(
                "curp",
                DataType::Curp,
                ComparisonOp::FailsChecksum,
                Operand::None,
            ),
            RuleAction::reject("population registry key {value} is not valid"),
        ),
        ValidatorRule::new(
            "RT-002",
            "Worker NSS verification digit",
            &["02"],
            20,
            ConditionNode::leaf(
                "nss",
                DataType::Nss,
                ComparisonOp::FailsChecksum,
                Operand::None,
            ),
            RuleAction::reject("social security number {value} failed its verification digit"),
        ),
        ValidatorRule::new(
            "RT-003",
            "Base wage below general minimum",
            &["02"],
            30,
            ConditionNode::leaf(
                "base_wage",
                DataType::Decimal,
                ComparisonOp::Lt,
                Operand::Literal("278.80".to_string()),
            ),
            RuleAction::warn("base contribution wage {value} is below the general minimum")
                .expected(">= 278.80"),
        ),
        ValidatorRule::new(
            "RT-004",
            "Unpaid-leave status",
            &["02"],
            40,
            ConditionNode::leaf(
                "worker_status",
                DataType::Text,
                ComparisonOp::Eq,
                Operand::Literal("03".to_string()),
            ),
            RuleAction::log("worker reported on unpaid leave on line {line}"),
        ),
        ValidatorRule::new(
            "RT-010",
            "Footer movement count cross-check",
            &["09"],
            50,
            ConditionNode::leaf(
                "@detail_count",
                DataType::Integer,
                ComparisonOp::Ne,
                Operand::Field("detail_count".to_string()),
            ),
            RuleAction::reject("declared movement count does not match the {value} movement records")
                .on_field("detail_count"),
        ),
    ]
}
