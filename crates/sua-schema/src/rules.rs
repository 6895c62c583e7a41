//! The validator-rule data model.
//!
//! Rules are data, not code: a rule binds a condition tree to file/record
//! filters and an action. The whole model round-trips through serde so an
//! external authoring surface can add or modify rules without recompiling
//! the evaluator.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::file::FileType;

/// Semantic type a condition leaf coerces both sides to before comparing.
///
/// The identifier variants route the comparison through the corresponding
/// checksum type's normalization, and enable [`ComparisonOp::FailsChecksum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Integer,
    Decimal,
    Date,
    Flag,
    Curp,
    Rfc,
    Nss,
    Clabe,
}

/// Comparison operators available to condition leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    MatchesPattern,
    InList,
    NotInList,
    IsEmpty,
    IsNotEmpty,
    Between,
    /// Identifier-typed leaves only: true when the value is present but
    /// fails the identifier's validation (length, components, check digit).
    FailsChecksum,
}

/// Logical connectives for condition groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

/// Right-hand side of a leaf comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operand {
    /// No operand (`is-empty`, `is-not-empty`, `fails-checksum`).
    #[default]
    None,
    /// A literal value, interpreted under the leaf's data type.
    Literal(String),
    /// A literal list (`in-list`, `not-in-list`).
    List(Vec<String>),
    /// Another field of the same record (field-to-field comparison).
    Field(String),
    /// An inclusive range (`between`).
    Range { low: String, high: String },
}

/// A condition tree: either a single field comparison or a logical group
/// over child conditions.
///
/// The variant set is closed on purpose so every operator is handled
/// exhaustively by the evaluator. Groups follow the documented algebra:
/// an empty `and` evaluates true, an empty `or` evaluates false, and
/// `not` takes exactly one child (enforced when rule sets load).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum ConditionNode {
    Leaf {
        field: String,
        #[serde(rename = "type")]
        data_type: DataType,
        op: ComparisonOp,
        #[serde(default, skip_serializing_if = "operand_is_none")]
        operand: Operand,
    },
    Group {
        op: LogicalOp,
        #[serde(default)]
        children: Vec<ConditionNode>,
    },
}

fn operand_is_none(operand: &Operand) -> bool {
    matches!(operand, Operand::None)
}

impl ConditionNode {
    pub fn leaf(field: &str, data_type: DataType, op: ComparisonOp, operand: Operand) -> Self {
        ConditionNode::Leaf {
            field: field.to_string(),
            data_type,
            op,
            operand,
        }
    }

    pub fn all(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            op: LogicalOp::And,
            children,
        }
    }

    pub fn any(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            op: LogicalOp::Or,
            children,
        }
    }

    pub fn negate(child: ConditionNode) -> Self {
        ConditionNode::Group {
            op: LogicalOp::Not,
            children: vec![child],
        }
    }

    /// First leaf field in document order; used to attribute violations
    /// when the action does not name a field itself.
    pub fn primary_field(&self) -> Option<&str> {
        match self {
            ConditionNode::Leaf { field, .. } => Some(field),
            ConditionNode::Group { children, .. } => {
                children.iter().find_map(ConditionNode::primary_field)
            }
        }
    }
}

/// What firing a rule does to the record under evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Record an error; the record becomes invalid.
    Reject,
    /// Record a warning; the record stays valid but flagged.
    Warn,
    /// Record an informational entry with no effect on validity.
    Log,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Reject => "reject",
            ActionKind::Warn => "warn",
            ActionKind::Log => "log",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action attached to a rule.
///
/// `message` is a template; `{field}`, `{value}` and `{line}` expand at
/// evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub kind: ActionKind,
    pub message: String,
    /// Machine-readable violation code; defaults to the rule's own code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Field to attribute the violation to; defaults to the condition
    /// tree's first leaf field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Expected value or pattern, surfaced verbatim in the violation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl RuleAction {
    pub fn reject(message: &str) -> Self {
        Self::with_kind(ActionKind::Reject, message)
    }

    pub fn warn(message: &str) -> Self {
        Self::with_kind(ActionKind::Warn, message)
    }

    pub fn log(message: &str) -> Self {
        Self::with_kind(ActionKind::Log, message)
    }

    fn with_kind(kind: ActionKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
            code: None,
            field: None,
            expected: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn expected(mut self, expected: &str) -> Self {
        self.expected = Some(expected.to_string());
        self
    }

    pub fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

/// One validator rule: unique code, filters, run order, condition tree
/// and action. Loaded once, read-only during evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorRule {
    pub code: String,
    pub name: String,
    /// File types the rule applies to; empty means all.
    #[serde(default)]
    pub file_types: Vec<FileType>,
    /// Record-type codes the rule applies to; empty means all.
    #[serde(default)]
    pub record_types: Vec<String>,
    pub run_order: u32,
    pub condition: ConditionNode,
    pub action: RuleAction,
}

impl ValidatorRule {
    pub fn new(
        code: &str,
        name: &str,
        record_types: &[&str],
        run_order: u32,
        condition: ConditionNode,
        action: RuleAction,
    ) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            file_types: Vec::new(),
            record_types: record_types.iter().map(|s| s.to_string()).collect(),
            run_order,
            condition,
            action,
        }
    }

    pub fn applies_to_file(&self, file_type: FileType) -> bool {
        self.file_types.is_empty() || self.file_types.contains(&file_type)
    }

    pub fn applies_to_record(&self, record_code: &str) -> bool {
        self.record_types.is_empty() || self.record_types.iter().any(|c| c == record_code)
    }

    /// Violation code: the action's override or the rule's own code.
    pub fn violation_code(&self) -> &str {
        self.action.code.as_deref().unwrap_or(&self.code)
    }

    /// Field attribution: the action's override or the first leaf field.
    pub fn violation_field(&self) -> Option<&str> {
        self.action
            .field
            .as_deref()
            .or_else(|| self.condition.primary_field())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(DataType::Text),
            "integer" => Ok(DataType::Integer),
            "decimal" => Ok(DataType::Decimal),
            "date" => Ok(DataType::Date),
            "flag" => Ok(DataType::Flag),
            "curp" => Ok(DataType::Curp),
            "rfc" => Ok(DataType::Rfc),
            "nss" => Ok(DataType::Nss),
            "clabe" => Ok(DataType::Clabe),
            _ => Err(format!("Unknown data type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_tree_roundtrips_through_json() {
        let condition = ConditionNode::all(vec![
            ConditionNode::leaf(
                "nss",
                DataType::Nss,
                ComparisonOp::FailsChecksum,
                Operand::None,
            ),
            ConditionNode::negate(ConditionNode::leaf(
                "days_worked",
                DataType::Integer,
                ComparisonOp::Between,
                Operand::Range {
                    low: "0".to_string(),
                    high: "31".to_string(),
                },
            )),
        ]);
        let json = serde_json::to_string_pretty(&condition).expect("serialize condition");
        let round: ConditionNode = serde_json::from_str(&json).expect("deserialize condition");
        assert_eq!(round, condition);
    }

    #[test]
    fn leaf_operand_defaults_to_none() {
        let json = r#"{ "node": "leaf", "field": "curp", "type": "curp", "op": "fails-checksum" }"#;
        let node: ConditionNode = serde_json::from_str(json).expect("deserialize leaf");
        assert_eq!(
            node,
            ConditionNode::leaf(
                "curp",
                DataType::Curp,
                ComparisonOp::FailsChecksum,
                Operand::None
            )
        );
    }

    #[test]
    fn primary_field_finds_first_leaf() {
        let condition = ConditionNode::any(vec![
            ConditionNode::Group {
                op: LogicalOp::And,
                children: vec![],
            },
            ConditionNode::leaf(
                "amount",
                DataType::Decimal,
                ComparisonOp::IsEmpty,
                Operand::None,
            ),
        ]);
        assert_eq!(condition.primary_field(), Some("amount"));
    }

    #[test]
    fn rule_filters() {
        let rule = ValidatorRule::new(
            "AP-001",
            "NSS check digit",
            &["02"],
            10,
            ConditionNode::leaf(
                "nss",
                DataType::Nss,
                ComparisonOp::FailsChecksum,
                Operand::None,
            ),
            RuleAction::reject("bad nss"),
        );
        assert!(rule.applies_to_record("02"));
        assert!(!rule.applies_to_record("09"));
        // Empty file-type filter applies everywhere.
        assert!(rule.applies_to_file(FileType::PayrollContribution));
        assert_eq!(rule.violation_code(), "AP-001");
        assert_eq!(rule.violation_field(), Some("nss"));
    }
}
