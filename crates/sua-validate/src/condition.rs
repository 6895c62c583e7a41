//! Recursive condition-tree evaluation.
//!
//! Evaluation is a pure function of (node, record, context): no side
//! effects, no shared state, safe to run concurrently across independent
//! records. Group semantics follow the documented algebra: `and` over no
//! children is true, `or` over no children is false, and `not` inverts
//! its single child.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use sua_model::{Clabe, Curp, FieldValue, Nss, ParsedRecord, Rfc, parse_fixed_date};
use sua_schema::{ComparisonOp, ConditionNode, DataType, LogicalOp, Operand};

/// Evaluation-time context: the date that anchors identifier embedded-date
/// checks.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
    pub evaluation_date: NaiveDate,
}

impl EvalContext {
    pub fn new(evaluation_date: NaiveDate) -> Self {
        Self { evaluation_date }
    }
}

/// Evaluate a condition tree against a parsed record.
///
/// An absent field reads as the empty value; it never raises. Both sides
/// of a leaf comparison are coerced to the leaf's declared data type
/// before comparing, so numeric comparisons are numeric, never lexical.
pub fn evaluate(node: &ConditionNode, record: &ParsedRecord, ctx: &EvalContext) -> bool {
    match node {
        ConditionNode::Group { op, children } => match op {
            LogicalOp::And => children.iter().all(|child| evaluate(child, record, ctx)),
            LogicalOp::Or => children.iter().any(|child| evaluate(child, record, ctx)),
            // Arity is enforced when rule sets load.
            LogicalOp::Not => children
                .first()
                .is_none_or(|child| !evaluate(child, record, ctx)),
        },
        ConditionNode::Leaf {
            field,
            data_type,
            op,
            operand,
        } => evaluate_leaf(record, field, *data_type, *op, operand, ctx),
    }
}

fn evaluate_leaf(
    record: &ParsedRecord,
    field: &str,
    data_type: DataType,
    op: ComparisonOp,
    operand: &Operand,
    ctx: &EvalContext,
) -> bool {
    let value = record.field(field).unwrap_or(&FieldValue::Empty);
    let ordered = |wanted: fn(Ordering) -> bool| {
        let left = coerce_value(value, data_type);
        compare(&left, &rhs(operand, record, data_type)).is_some_and(wanted)
    };

    match op {
        ComparisonOp::IsEmpty => value.is_empty(),
        ComparisonOp::IsNotEmpty => !value.is_empty(),
        ComparisonOp::FailsChecksum => fails_checksum(value, data_type, ctx),
        ComparisonOp::Eq => ordered(|o| o == Ordering::Equal),
        ComparisonOp::Ne => ordered(|o| o != Ordering::Equal),
        ComparisonOp::Gt => ordered(|o| o == Ordering::Greater),
        ComparisonOp::Ge => ordered(|o| o != Ordering::Less),
        ComparisonOp::Lt => ordered(|o| o == Ordering::Less),
        ComparisonOp::Le => ordered(|o| o != Ordering::Greater),
        ComparisonOp::Contains => text_op(value, operand, record, |v, n| v.contains(n)),
        ComparisonOp::NotContains => !text_op(value, operand, record, |v, n| v.contains(n)),
        ComparisonOp::StartsWith => text_op(value, operand, record, |v, n| v.starts_with(n)),
        ComparisonOp::EndsWith => text_op(value, operand, record, |v, n| v.ends_with(n)),
        ComparisonOp::MatchesPattern => matches_pattern(value, operand),
        ComparisonOp::InList => in_list(&coerce_value(value, data_type), operand, data_type),
        ComparisonOp::NotInList => !in_list(&coerce_value(value, data_type), operand, data_type),
        ComparisonOp::Between => between(&coerce_value(value, data_type), operand, data_type),
    }
}

/// A field value coerced into the comparison domain of one data type.
/// `Missing` makes every ordered comparison false.
#[derive(Debug, Clone, PartialEq)]
enum Typed {
    Text(String),
    Int(i64),
    Dec(Decimal),
    Date(NaiveDate),
    Flag(bool),
    Missing,
}

fn coerce_value(value: &FieldValue, data_type: DataType) -> Typed {
    match data_type {
        DataType::Text => Typed::Text(value.as_text()),
        DataType::Integer => match value {
            FieldValue::Integer(n) => Typed::Int(*n),
            FieldValue::Text(s) => coerce_text(s, data_type),
            _ => Typed::Missing,
        },
        DataType::Decimal => match value.as_decimal() {
            Some(d) => Typed::Dec(d),
            None => match value {
                FieldValue::Text(s) => coerce_text(s, data_type),
                _ => Typed::Missing,
            },
        },
        DataType::Date => match value {
            FieldValue::Date(d) => Typed::Date(*d),
            FieldValue::Text(s) => coerce_text(s, data_type),
            _ => Typed::Missing,
        },
        DataType::Flag => match value {
            FieldValue::Flag(b) => Typed::Flag(*b),
            FieldValue::Text(s) => coerce_text(s, data_type),
            _ => Typed::Missing,
        },
        // Identifier comparisons run over the normalized string form.
        DataType::Curp | DataType::Rfc | DataType::Nss | DataType::Clabe => match value {
            FieldValue::Empty => Typed::Missing,
            _ => Typed::Text(normalize_identifier(&value.as_text())),
        },
    }
}

fn coerce_text(text: &str, data_type: DataType) -> Typed {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return match data_type {
            DataType::Text => Typed::Text(String::new()),
            _ => Typed::Missing,
        };
    }
    match data_type {
        DataType::Text => Typed::Text(trimmed.to_string()),
        DataType::Integer => trimmed
            .parse::<i64>()
            .map(Typed::Int)
            .unwrap_or(Typed::Missing),
        DataType::Decimal => Decimal::from_str(trimmed)
            .map(Typed::Dec)
            .unwrap_or(Typed::Missing),
        DataType::Date => parse_fixed_date(trimmed)
            .map(Typed::Date)
            .unwrap_or(Typed::Missing),
        DataType::Flag => match trimmed {
            "1" | "S" | "true" => Typed::Flag(true),
            "0" | "N" | "false" => Typed::Flag(false),
            _ => Typed::Missing,
        },
        DataType::Curp | DataType::Rfc | DataType::Nss | DataType::Clabe => {
            Typed::Text(normalize_identifier(trimmed))
        }
    }
}

/// Right-hand side of a comparison: a literal under the leaf's type, or
/// another field of the same record.
fn rhs(operand: &Operand, record: &ParsedRecord, data_type: DataType) -> Typed {
    match operand {
        Operand::Literal(literal) => coerce_text(literal, data_type),
        Operand::Field(name) => {
            let value = record.field(name).unwrap_or(&FieldValue::Empty);
            coerce_value(value, data_type)
        }
        _ => Typed::Missing,
    }
}

fn compare(left: &Typed, right: &Typed) -> Option<Ordering> {
    match (left, right) {
        (Typed::Text(a), Typed::Text(b)) => Some(a.cmp(b)),
        (Typed::Int(a), Typed::Int(b)) => Some(a.cmp(b)),
        (Typed::Dec(a), Typed::Dec(b)) => a.partial_cmp(b),
        (Typed::Date(a), Typed::Date(b)) => Some(a.cmp(b)),
        (Typed::Flag(a), Typed::Flag(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn text_op(
    value: &FieldValue,
    operand: &Operand,
    record: &ParsedRecord,
    apply: impl Fn(&str, &str) -> bool,
) -> bool {
    let needle = match operand {
        Operand::Literal(literal) => literal.clone(),
        Operand::Field(name) => record
            .field(name)
            .unwrap_or(&FieldValue::Empty)
            .as_text(),
        _ => return false,
    };
    apply(&value.as_text(), &needle)
}

fn matches_pattern(value: &FieldValue, operand: &Operand) -> bool {
    let Operand::Literal(pattern) = operand else {
        return false;
    };
    // Pattern syntax is validated when the rule set loads.
    let Ok(regex) = regex::Regex::new(pattern) else {
        return false;
    };
    regex.is_match(&value.as_text())
}

fn in_list(left: &Typed, operand: &Operand, data_type: DataType) -> bool {
    let Operand::List(items) = operand else {
        return false;
    };
    if matches!(left, Typed::Missing) {
        return false;
    }
    items
        .iter()
        .any(|item| compare(left, &coerce_text(item, data_type)) == Some(Ordering::Equal))
}

fn between(left: &Typed, operand: &Operand, data_type: DataType) -> bool {
    let Operand::Range { low, high } = operand else {
        return false;
    };
    let low = coerce_text(low, data_type);
    let high = coerce_text(high, data_type);
    compare(left, &low).is_some_and(|o| o != Ordering::Less)
        && compare(left, &high).is_some_and(|o| o != Ordering::Greater)
}

fn fails_checksum(value: &FieldValue, data_type: DataType, ctx: &EvalContext) -> bool {
    // Empty values are the business of required/is-empty rules.
    if value.is_empty() {
        return false;
    }
    let text = value.as_text();
    match data_type {
        DataType::Curp => !Curp::is_valid_as_of(&text, ctx.evaluation_date),
        DataType::Rfc => !Rfc::is_valid_as_of(&text, ctx.evaluation_date),
        DataType::Nss => !Nss::is_valid(&text),
        DataType::Clabe => !Clabe::is_valid(&text),
        // Non-identifier types are rejected when the rule set loads.
        _ => false,
    }
}

/// Identifier normalization for equality: uppercase, separators stripped.
fn normalize_identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sua_model::{Currency, Money};
    use sua_schema::ConditionNode as Node;

    fn ctx() -> EvalContext {
        EvalContext::new(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
    }

    fn record() -> ParsedRecord {
        let mut record = ParsedRecord::new(1, "02");
        record.set_field("name", FieldValue::Text("PEREZ LOPEZ JUAN".into()));
        record.set_field("days", FieldValue::Integer(15));
        record.set_field(
            "amount",
            FieldValue::Amount(Money::from_cents(123_450, Currency::Mxn)),
        );
        record.set_field(
            "date",
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        );
        record.set_field("flag", FieldValue::Flag(true));
        record.set_field("nss", FieldValue::Text("12345678903".into()));
        record.set_field("status", FieldValue::Unparsed("ZZ".into()));
        record
    }

    fn leaf(field: &str, data_type: DataType, op: ComparisonOp, operand: Operand) -> Node {
        Node::leaf(field, data_type, op, operand)
    }

    #[test]
    fn empty_and_is_true_empty_or_is_false() {
        let record = record();
        assert!(evaluate(&Node::all(vec![]), &record, &ctx()));
        assert!(!evaluate(&Node::any(vec![]), &record, &ctx()));
    }

    #[test]
    fn not_inverts_its_child() {
        let record = record();
        let truthy = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::Eq,
            Operand::Literal("15".into()),
        );
        assert!(evaluate(&truthy, &record, &ctx()));
        assert!(!evaluate(&Node::negate(truthy.clone()), &record, &ctx()));
        assert!(evaluate(
            &Node::negate(Node::negate(truthy)),
            &record,
            &ctx()
        ));
    }

    #[test]
    fn numeric_comparison_is_numeric_not_lexical() {
        let record = record();
        // Lexically "15" > "120", numerically it is not.
        let node = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::Gt,
            Operand::Literal("120".into()),
        );
        assert!(!evaluate(&node, &record, &ctx()));
        let node = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::Lt,
            Operand::Literal("120".into()),
        );
        assert!(evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn decimal_comparison_reads_amounts() {
        let record = record();
        let node = leaf(
            "amount",
            DataType::Decimal,
            ComparisonOp::Ge,
            Operand::Literal("1234.50".into()),
        );
        assert!(evaluate(&node, &record, &ctx()));
        let node = leaf(
            "amount",
            DataType::Decimal,
            ComparisonOp::Gt,
            Operand::Literal("1234.50".into()),
        );
        assert!(!evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn date_comparison() {
        let record = record();
        let node = leaf(
            "date",
            DataType::Date,
            ComparisonOp::Lt,
            Operand::Literal("20240201".into()),
        );
        assert!(evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn absent_field_reads_as_empty() {
        let record = record();
        let node = leaf("missing", DataType::Text, ComparisonOp::IsEmpty, Operand::None);
        assert!(evaluate(&node, &record, &ctx()));
        // Ordered comparisons against a missing numeric field are false.
        let node = leaf(
            "missing",
            DataType::Integer,
            ComparisonOp::Lt,
            Operand::Literal("10".into()),
        );
        assert!(!evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn unparsed_is_distinct_from_zero() {
        let record = record();
        let node = leaf(
            "status",
            DataType::Integer,
            ComparisonOp::Eq,
            Operand::Literal("0".into()),
        );
        assert!(!evaluate(&node, &record, &ctx()));
        let node = leaf(
            "status",
            DataType::Integer,
            ComparisonOp::IsNotEmpty,
            Operand::None,
        );
        assert!(evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn text_operators() {
        let record = record();
        let contains = leaf(
            "name",
            DataType::Text,
            ComparisonOp::Contains,
            Operand::Literal("LOPEZ".into()),
        );
        assert!(evaluate(&contains, &record, &ctx()));
        let starts = leaf(
            "name",
            DataType::Text,
            ComparisonOp::StartsWith,
            Operand::Literal("PEREZ".into()),
        );
        assert!(evaluate(&starts, &record, &ctx()));
        let ends = leaf(
            "name",
            DataType::Text,
            ComparisonOp::EndsWith,
            Operand::Literal("JUAN".into()),
        );
        assert!(evaluate(&ends, &record, &ctx()));
        let pattern = leaf(
            "name",
            DataType::Text,
            ComparisonOp::MatchesPattern,
            Operand::Literal(r"^[A-Z ]+$".into()),
        );
        assert!(evaluate(&pattern, &record, &ctx()));
    }

    #[test]
    fn list_and_range_operators() {
        let record = record();
        let in_list = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::InList,
            Operand::List(vec!["10".into(), "15".into(), "20".into()]),
        );
        assert!(evaluate(&in_list, &record, &ctx()));
        let not_in = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::NotInList,
            Operand::List(vec!["1".into(), "2".into()]),
        );
        assert!(evaluate(&not_in, &record, &ctx()));
        let between = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::Between,
            Operand::Range {
                low: "15".into(),
                high: "31".into(),
            },
        );
        assert!(evaluate(&between, &record, &ctx()));
        let outside = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::Between,
            Operand::Range {
                low: "16".into(),
                high: "31".into(),
            },
        );
        assert!(!evaluate(&outside, &record, &ctx()));
    }

    #[test]
    fn field_to_field_comparison() {
        let mut record = record();
        record.set_field("other_days", FieldValue::Integer(15));
        let node = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::Eq,
            Operand::Field("other_days".into()),
        );
        assert!(evaluate(&node, &record, &ctx()));
        record.set_field("other_days", FieldValue::Integer(16));
        let node = leaf(
            "days",
            DataType::Integer,
            ComparisonOp::Ne,
            Operand::Field("other_days".into()),
        );
        assert!(evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn checksum_leaf_fires_only_on_present_invalid_values() {
        let mut record = record();
        let node = leaf("nss", DataType::Nss, ComparisonOp::FailsChecksum, Operand::None);
        // Valid NSS: no trigger.
        assert!(!evaluate(&node, &record, &ctx()));
        // Flipped check digit: trigger.
        record.set_field("nss", FieldValue::Text("12345678904".into()));
        assert!(evaluate(&node, &record, &ctx()));
        // Empty: no trigger; emptiness is a different rule's business.
        record.set_field("nss", FieldValue::Empty);
        assert!(!evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn identifier_equality_compares_normalized_forms() {
        let mut record = record();
        record.set_field("nss", FieldValue::Text("12-34-56-7890-3".into()));
        let node = leaf(
            "nss",
            DataType::Nss,
            ComparisonOp::Eq,
            Operand::Literal("12345678903".into()),
        );
        assert!(evaluate(&node, &record, &ctx()));
    }

    #[test]
    fn nested_groups_evaluate_recursively() {
        let record = record();
        let node = Node::all(vec![
            Node::any(vec![
                leaf(
                    "days",
                    DataType::Integer,
                    ComparisonOp::Gt,
                    Operand::Literal("20".into()),
                ),
                leaf(
                    "flag",
                    DataType::Flag,
                    ComparisonOp::Eq,
                    Operand::Literal("1".into()),
                ),
            ]),
            Node::negate(leaf(
                "name",
                DataType::Text,
                ComparisonOp::IsEmpty,
                Operand::None,
            )),
        ]);
        assert!(evaluate(&node, &record, &ctx()));
    }
}
