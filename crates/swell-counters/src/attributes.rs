//! Attribute dimensions attached to counter increments.

use std::fmt;

use serde::Serialize;
use swell_core::ClusterRef;

/// Attribute key carrying the project that owns the cluster.
pub const CLUSTER_PROJECT_ID: &str = "cluster_project_id";
/// Attribute key carrying the cluster identifier.
pub const CLUSTER_INSTANCE_ID: &str = "cluster_instance_id";
/// Attribute key carrying the direction on scaling outcome counters.
pub const SCALING_DIRECTION: &str = "scaling_direction";

/// An ordered set of attribute key/value pairs.
///
/// Pairs are kept sorted by key, so two increments with the same dimensions
/// always land in the same delta bucket no matter how the set was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AttributeSet {
    pairs: Vec<(String, String)>,
}

impl AttributeSet {
    /// The empty set, for process-wide counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity dimensions for a cluster-scoped counter.
    pub fn for_cluster(cluster: &ClusterRef) -> Self {
        Self::new()
            .with(CLUSTER_PROJECT_ID, &cluster.project_id)
            .with(CLUSTER_INSTANCE_ID, &cluster.cluster_id)
    }

    /// Add a dimension, replacing any existing value under the same key.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        match self
            .pairs
            .binary_search_by(|(existing, _)| existing.as_str().cmp(key))
        {
            Ok(i) => self.pairs[i].1 = value.to_string(),
            Err(i) => self.pairs.insert(i, (key.to_string(), value.to_string())),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .binary_search_by(|(existing, _)| existing.as_str().cmp(key))
            .ok()
            .map(|i| self.pairs[i].1.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
