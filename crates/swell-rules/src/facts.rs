//! Fact sets — the metric values a rule set is evaluated against.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The facts for one evaluation cycle of one cluster.
///
/// A fact is a named numeric value, typically a utilization metric sampled
/// by the poller. Fact sets are plain data: building one never fails, and
/// looking up a name that was never inserted yields `None` rather than an
/// error. Conditions treat such missing facts as unsatisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSet {
    values: HashMap<String, f64>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, f64>> for FactSet {
    fn from(values: HashMap<String, f64>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, f64)> for FactSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
