//! Leaf conditions — single threshold comparisons over one fact.

use serde::{Deserialize, Serialize};

use crate::facts::FactSet;

/// Comparison operator between a fact value and a rule threshold.
///
/// Wire names are camelCase (`greaterThan`, `lessThanOrEqual`, ...) to
/// match the rule files produced for the upstream JSON rule format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOp {
    GreaterThan,
    LessThan,
    Equal,
    NotEqual,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl ComparisonOp {
    /// Apply the operator to `(fact value, threshold)`.
    ///
    /// Equality is exact IEEE 754 comparison. Callers that need tolerance
    /// must round their facts before evaluation.
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOp::GreaterThan => value > threshold,
            ComparisonOp::LessThan => value < threshold,
            ComparisonOp::Equal => value == threshold,
            ComparisonOp::NotEqual => value != threshold,
            ComparisonOp::GreaterThanOrEqual => value >= threshold,
            ComparisonOp::LessThanOrEqual => value <= threshold,
        }
    }
}

/// A single predicate: compare one fact against a fixed threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Name of the fact under test.
    pub fact: String,
    pub operator: ComparisonOp,
    /// Threshold the fact value is compared against.
    pub value: f64,
}

impl Condition {
    pub fn new(fact: impl Into<String>, operator: ComparisonOp, value: f64) -> Self {
        Self {
            fact: fact.into(),
            operator,
            value,
        }
    }

    /// Whether the condition is satisfied by `facts`.
    ///
    /// A fact absent from the set is never an error; the condition is
    /// simply unsatisfied. Rules over incomplete metric data degrade to
    /// not firing instead of failing the cycle.
    pub fn evaluate(&self, facts: &FactSet) -> bool {
        facts
            .get(&self.fact)
            .is_some_and(|value| self.operator.compare(value, self.value))
    }
}
