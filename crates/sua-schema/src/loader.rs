//! JSON rule-set loading and structural validation.
//!
//! Rule sets arrive as configuration data so the authoring surface can
//! evolve without recompiling the evaluator. Loading checks everything
//! the evaluator assumes: unique codes, `not` arity, operand shapes per
//! operator, compilable patterns, and identifier types behind
//! `fails-checksum`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rules::{ComparisonOp, ConditionNode, DataType, LogicalOp, Operand, ValidatorRule};

#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate rule code {code:?}")]
    DuplicateCode { code: String },

    #[error("rule {code:?}: `not` group takes exactly one child, found {children}")]
    NotArity { code: String, children: usize },

    #[error("rule {code:?}: operator needs {expected} operand")]
    BadOperand { code: String, expected: &'static str },

    #[error("rule {code:?}: invalid pattern {pattern:?}: {source}")]
    BadPattern {
        code: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule {code:?}: `fails-checksum` needs an identifier data type")]
    ChecksumType { code: String },
}

/// Parse and validate a JSON array of rules.
pub fn parse_rules_json(json: &str) -> Result<Vec<ValidatorRule>, RuleLoadError> {
    let rules: Vec<ValidatorRule> = serde_json::from_str(json)?;
    validate_rules(&rules)?;
    Ok(rules)
}

/// Load and validate a rule set from a JSON file.
pub fn load_rules_json(path: &Path) -> Result<Vec<ValidatorRule>, RuleLoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules_json(&json)
}

/// Structural validation shared by external and built-in rule sets.
pub fn validate_rules(rules: &[ValidatorRule]) -> Result<(), RuleLoadError> {
    let mut seen = std::collections::BTreeSet::new();
    for rule in rules {
        if !seen.insert(rule.code.clone()) {
            return Err(RuleLoadError::DuplicateCode {
                code: rule.code.clone(),
            });
        }
        check_condition(&rule.code, &rule.condition)?;
    }
    Ok(())
}

fn check_condition(code: &str, node: &ConditionNode) -> Result<(), RuleLoadError> {
    match node {
        ConditionNode::Group { op, children } => {
            if *op == LogicalOp::Not && children.len() != 1 {
                return Err(RuleLoadError::NotArity {
                    code: code.to_string(),
                    children: children.len(),
                });
            }
            for child in children {
                check_condition(code, child)?;
            }
            Ok(())
        }
        ConditionNode::Leaf {
            data_type,
            op,
            operand,
            ..
        } => check_leaf(code, *data_type, *op, operand),
    }
}

fn check_leaf(
    code: &str,
    data_type: DataType,
    op: ComparisonOp,
    operand: &Operand,
) -> Result<(), RuleLoadError> {
    let bad = |expected: &'static str| RuleLoadError::BadOperand {
        code: code.to_string(),
        expected,
    };
    match op {
        ComparisonOp::Eq
        | ComparisonOp::Ne
        | ComparisonOp::Gt
        | ComparisonOp::Ge
        | ComparisonOp::Lt
        | ComparisonOp::Le
        | ComparisonOp::Contains
        | ComparisonOp::NotContains
        | ComparisonOp::StartsWith
        | ComparisonOp::EndsWith => match operand {
            Operand::Literal(_) | Operand::Field(_) => Ok(()),
            _ => Err(bad("a literal or field")),
        },
        ComparisonOp::MatchesPattern => match operand {
            Operand::Literal(pattern) => {
                regex::Regex::new(pattern).map_err(|source| RuleLoadError::BadPattern {
                    code: code.to_string(),
                    pattern: pattern.clone(),
                    source,
                })?;
                Ok(())
            }
            _ => Err(bad("a literal pattern")),
        },
        ComparisonOp::InList | ComparisonOp::NotInList => match operand {
            Operand::List(_) => Ok(()),
            _ => Err(bad("a list")),
        },
        ComparisonOp::Between => match operand {
            Operand::Range { .. } => Ok(()),
            _ => Err(bad("a range")),
        },
        ComparisonOp::IsEmpty | ComparisonOp::IsNotEmpty => match operand {
            Operand::None => Ok(()),
            _ => Err(bad("no")),
        },
        ComparisonOp::FailsChecksum => {
            if !matches!(operand, Operand::None) {
                return Err(bad("no"));
            }
            match data_type {
                DataType::Curp | DataType::Rfc | DataType::Nss | DataType::Clabe => Ok(()),
                _ => Err(RuleLoadError::ChecksumType {
                    code: code.to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"
    [
        {
            "code": "X-001",
            "name": "NSS check",
            "record_types": ["02"],
            "run_order": 10,
            "condition": {
                "node": "leaf",
                "field": "nss",
                "type": "nss",
                "op": "fails-checksum"
            },
            "action": { "kind": "reject", "message": "bad nss {value}" }
        },
        {
            "code": "X-002",
            "name": "wage floor",
            "record_types": ["02"],
            "run_order": 20,
            "condition": {
                "node": "group",
                "op": "and",
                "children": [
                    {
                        "node": "leaf",
                        "field": "daily_wage",
                        "type": "decimal",
                        "op": "lt",
                        "operand": { "literal": "278.80" }
                    },
                    {
                        "node": "leaf",
                        "field": "days_worked",
                        "type": "integer",
                        "op": "gt",
                        "operand": { "literal": "0" }
                    }
                ]
            },
            "action": { "kind": "warn", "message": "low wage" }
        }
    ]
    "#;

    #[test]
    fn parses_a_rule_set() {
        let rules = parse_rules_json(RULES).expect("rule set parses");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].code, "X-001");
        assert!(rules[0].applies_to_record("02"));
    }

    #[test]
    fn rejects_duplicate_codes() {
        let mut rules = parse_rules_json(RULES).unwrap();
        let mut dup = rules[0].clone();
        dup.run_order = 99;
        rules.push(dup);
        assert!(matches!(
            validate_rules(&rules),
            Err(RuleLoadError::DuplicateCode { .. })
        ));
    }

    #[test]
    fn rejects_not_with_two_children() {
        let json = r#"
        [{
            "code": "X-003",
            "name": "bad not",
            "run_order": 1,
            "condition": {
                "node": "group",
                "op": "not",
                "children": [
                    { "node": "leaf", "field": "a", "type": "text", "op": "is-empty" },
                    { "node": "leaf", "field": "b", "type": "text", "op": "is-empty" }
                ]
            },
            "action": { "kind": "log", "message": "x" }
        }]
        "#;
        assert!(matches!(
            parse_rules_json(json),
            Err(RuleLoadError::NotArity { children: 2, .. })
        ));
    }

    #[test]
    fn rejects_between_without_range() {
        let json = r#"
        [{
            "code": "X-004",
            "name": "bad between",
            "run_order": 1,
            "condition": {
                "node": "leaf",
                "field": "days",
                "type": "integer",
                "op": "between",
                "operand": { "literal": "5" }
            },
            "action": { "kind": "reject", "message": "x" }
        }]
        "#;
        assert!(matches!(
            parse_rules_json(json),
            Err(RuleLoadError::BadOperand { .. })
        ));
    }

    #[test]
    fn rejects_checksum_on_plain_text() {
        let json = r#"
        [{
            "code": "X-005",
            "name": "bad checksum type",
            "run_order": 1,
            "condition": {
                "node": "leaf",
                "field": "name",
                "type": "text",
                "op": "fails-checksum"
            },
            "action": { "kind": "reject", "message": "x" }
        }]
        "#;
        assert!(matches!(
            parse_rules_json(json),
            Err(RuleLoadError::ChecksumType { .. })
        ));
    }

    #[test]
    fn rejects_unparseable_pattern() {
        let json = r#"
        [{
            "code": "X-006",
            "name": "bad pattern",
            "run_order": 1,
            "condition": {
                "node": "leaf",
                "field": "name",
                "type": "text",
                "op": "matches-pattern",
                "operand": { "literal": "[" }
            },
            "action": { "kind": "reject", "message": "x" }
        }]
        "#;
        assert!(matches!(
            parse_rules_json(json),
            Err(RuleLoadError::BadPattern { .. })
        ));
    }

    #[test]
    fn builtin_rule_sets_pass_the_same_validation() {
        use crate::file::{FileSchema, FileType};
        for file_type in FileType::all() {
            let schema = FileSchema::builtin(file_type).unwrap();
            validate_rules(schema.rules()).expect("built-in rules validate");
        }
    }
}
