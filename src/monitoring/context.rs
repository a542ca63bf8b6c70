use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::BorrowerId;

/// A single value inside the flattened borrower/facility snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl ContextValue {
    /// Numeric coercion used by the comparison operators. Numeric strings
    /// coerce; booleans do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ContextValue::Number(value) => Some(*value),
            ContextValue::Text(raw) => raw.trim().parse::<f64>().ok(),
            ContextValue::Boolean(_) => None,
        }
    }

    /// Equality across representations: same-variant equality, or both sides
    /// coercible to the same number (so `"3"` matches `3.0`).
    pub fn loose_eq(&self, other: &ContextValue) -> bool {
        if self == other {
            return true;
        }
        match (self.as_number(), other.as_number()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Number(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Boolean(value)
    }
}

pub type FieldMap = BTreeMap<String, ContextValue>;

/// Flattened borrower snapshot consumed by visibility rules: profile detail
/// fields plus an array of facility records. Borrowers may legitimately lack
/// either, so both default to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowerContext {
    pub detail: FieldMap,
    pub facilities: Vec<FieldMap>,
}

impl BorrowerContext {
    /// Self-reported collectibility from the borrower detail, defaulting to
    /// 0 when absent or non-numeric.
    pub fn collectibility(&self) -> i16 {
        self.detail
            .get("collectibility")
            .and_then(ContextValue::as_number)
            .map(|value| value.round() as i16)
            .unwrap_or(0)
    }
}

/// Supplies the context snapshot for a borrower. A borrower without any
/// recorded detail yields the empty context rather than an error.
pub trait ContextProvider: Send + Sync {
    fn context_for(&self, borrower: &BorrowerId) -> BorrowerContext;
}
