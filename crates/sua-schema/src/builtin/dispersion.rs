//! Bank dispersion (payment order) file: 90-character lines, record types
//! 01 (presenter header), 02 (payment detail) and 09 (totals footer).

use sua_model::{Currency, FieldType};

use crate::error::SchemaError;
use crate::field::FieldDefinition;
use crate::file::{AggregateSpec, FileSchema, FileType};
use crate::record::{RecordKind, RecordSchema};
use crate::rules::{ComparisonOp, ConditionNode, DataType, Operand, RuleAction, ValidatorRule};

const LINE_LENGTH: usize = 90;

pub(crate) fn bank_dispersion() -> Result<FileSchema, SchemaError> {
    FileSchema::new(
        FileType::BankDispersion,
        "bank dispersion",
        Currency::Mxn,
        (1, 2),
        vec![header()?, detail()?, footer()?],
        vec![
            AggregateSpec::count("detail_count", "02"),
            AggregateSpec::sum("detail_total", "02", "amount"),
        ],
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
            FieldDefinition::new("presenter_rfc", "Presenter taxpayer key", 3, 15, FieldType::Text)
                .required()
                .with_pattern(r"^[A-ZÑ&0-9]{12,13}$")?,
            // Scheduled dispersion dates may legitimately lie in the future.
            FieldDefinition::new("payment_date", "Payment date", 16, 23, FieldType::Date)
                .required(),
            FieldDefinition::new("batch_number", "Batch number", 24, 30, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new("filler", "Reserved", 31, 90, FieldType::Text),
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
            FieldDefinition::new("sequence", "Payment sequence", 3, 8, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new("clabe", "Beneficiary account number", 9, 26, FieldType::Text)
                .required()
                .with_pattern(r"^[0-9]{18}$")?,
            FieldDefinition::new("beneficiary_rfc", "Beneficiary taxpayer key", 27, 39, FieldType::Text),
            FieldDefinition::new("beneficiary_name", "Beneficiary name", 40, 79, FieldType::Text),
            FieldDefinition::new("amount", "Payment amount", 80, 88, FieldType::Currency)
                .required()
                .padded('0'),
            FieldDefinition::new("payment_type", "Payment type", 89, 90, FieldType::Text)
                .with_allowed(&[("01", "01"), ("02", "02")]),
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
            FieldDefinition::new("detail_count", "Declared payment count", 3, 8, FieldType::Integer)
                .required()
                .padded('0'),
            FieldDefinition::new("total_amount", "Declared payment total", 9, 23, FieldType::Currency)
                .required()
                .padded('0'),
            FieldDefinition::new("filler", "Reserved", 24, 90, FieldType::Text),
        ],
    )
}

fn rules() -> Vec<ValidatorRule> {
    vec![
        ValidatorRule::new(
            "DI-001",
            "Beneficiary account control digit",
            &["02"],
            10,
            ConditionNode::leaf(
                "clabe",
                DataType::Clabe,
                ComparisonOp::FailsChecksum,
                Operand::None,
            ),
            RuleAction::reject("account number {value} failed its control digit"),
        ),
        ValidatorRule::new(
            "DI-002",
            "Payment amount must be positive",
            &["02"],
            20,
            ConditionNode::negate(ConditionNode::leaf(
                "amount",
                DataType::Decimal,
                ComparisonOp::Gt,
                Operand::Literal("0".to_string()),
            )),
            RuleAction::reject("payment amount {value} must be greater than zero").expected("> 0"),
        ),
        ValidatorRule::new(
            "DI-003",
            "Missing beneficiary name",
            &["02"],
            30,
            ConditionNode::leaf(
                "beneficiary_name",
                DataType::Text,
                ComparisonOp::IsEmpty,
                Operand::None,
            ),
            RuleAction::warn("beneficiary name is empty"),
        ),
        ValidatorRule::new(
            "DI-004",
            "Large payment",
            &["02"],
            40,
            ConditionNode::leaf(
                "amount",
                DataType::Decimal,
                ComparisonOp::Ge,
                Operand::Literal("50000.00".to_string()),
            ),
            RuleAction::log("payment of {value} at or above the reporting threshold"),
        ),
        ValidatorRule::new(
            "DI-010",
            "Footer payment count cross-check",
            &["09"],
            50,
            ConditionNode::leaf(
                "@detail_count",
                DataType::Integer,
                ComparisonOp::Ne,
                Operand::Field("detail_count".to_string()),
            ),
            RuleAction::reject("declared payment count does not match the {value} payment records")
                .on_field("detail_count"),
        ),
        ValidatorRule::new(
            "DI-011",
            "Footer payment total cross-check",
            &["09"],
            60,
            ConditionNode::leaf(
                "@detail_total",
                DataType::Decimal,
                ComparisonOp::Ne,
                Operand::Field("total_amount".to_string()),
            ),
            RuleAction::reject(
                "declared payment total does not match the accumulated detail total {value}",
            )
            .on_field("total_amount"),
        ),
        ValidatorRule::new(
            "DI-020",
            "Batch number present",
            &["01"],
            70,
            ConditionNode::leaf(
                "batch_number",
                DataType::Integer,
                ComparisonOp::Eq,
                Operand::Literal("0".to_string()),
            ),
            RuleAction::warn("batch number is zero"),
        ),
    ]
}
