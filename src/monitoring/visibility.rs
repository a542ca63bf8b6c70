//! Conditional visibility rules stored as declarative (source, field,
//! operator, value) tuples and interpreted against a borrower context.
//! Evaluation never errors: absent fields simply fail to match.

use serde::{Deserialize, Serialize};

use super::context::{BorrowerContext, ContextValue};

/// Which half of the flattened snapshot the rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    BorrowerDetail,
    Facility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "in")]
    In,
}

/// Comparison operand; `Many` backs the set-membership operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Many(Vec<ContextValue>),
    One(ContextValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRule {
    pub source: RuleSource,
    pub field: String,
    pub operator: RuleOperator,
    pub value: RuleValue,
}

/// Entry point used by the scorer: no rule means visible.
pub fn is_visible(rule: Option<&VisibilityRule>, context: &BorrowerContext) -> bool {
    match rule {
        None => true,
        Some(rule) => evaluate(rule, context),
    }
}

/// Evaluate one rule against the snapshot. Facility rules pass when any
/// facility record matches.
pub fn evaluate(rule: &VisibilityRule, context: &BorrowerContext) -> bool {
    match rule.source {
        RuleSource::BorrowerDetail => context
            .detail
            .get(&rule.field)
            .map(|actual| matches_value(actual, rule))
            .unwrap_or(false),
        RuleSource::Facility => context.facilities.iter().any(|facility| {
            facility
                .get(&rule.field)
                .map(|actual| matches_value(actual, rule))
                .unwrap_or(false)
        }),
    }
}

fn matches_value(actual: &ContextValue, rule: &VisibilityRule) -> bool {
    match rule.operator {
        RuleOperator::Eq => scalar(rule)
            .map(|expected| actual.loose_eq(expected))
            .unwrap_or(false),
        RuleOperator::Ne => scalar(rule)
            .map(|expected| !actual.loose_eq(expected))
            .unwrap_or(false),
        RuleOperator::Gt => compare_numbers(actual, rule, |lhs, rhs| lhs > rhs),
        RuleOperator::Lt => compare_numbers(actual, rule, |lhs, rhs| lhs < rhs),
        RuleOperator::Gte => compare_numbers(actual, rule, |lhs, rhs| lhs >= rhs),
        RuleOperator::Lte => compare_numbers(actual, rule, |lhs, rhs| lhs <= rhs),
        RuleOperator::In => match &rule.value {
            RuleValue::Many(candidates) => candidates
                .iter()
                .any(|candidate| actual.loose_eq(candidate)),
            RuleValue::One(candidate) => actual.loose_eq(candidate),
        },
    }
}

fn scalar(rule: &VisibilityRule) -> Option<&ContextValue> {
    match &rule.value {
        RuleValue::One(value) => Some(value),
        RuleValue::Many(_) => None,
    }
}

fn compare_numbers(
    actual: &ContextValue,
    rule: &VisibilityRule,
    ordering: fn(f64, f64) -> bool,
) -> bool {
    let expected = match scalar(rule).and_then(ContextValue::as_number) {
        Some(value) => value,
        None => return false,
    };
    actual
        .as_number()
        .map(|value| ordering(value, expected))
        .unwrap_or(false)
}
