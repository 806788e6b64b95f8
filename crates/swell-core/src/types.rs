//! Shared types used across Swell crates.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a managed cluster, as carried on every metrics message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRef {
    /// Project that owns the cluster.
    pub project_id: String,
    /// Cluster identifier within the project.
    pub cluster_id: String,
}

impl ClusterRef {
    pub fn new(project_id: impl Into<String>, cluster_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            cluster_id: cluster_id.into(),
        }
    }
}

impl fmt::Display for ClusterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project_id, self.cluster_id)
    }
}

/// Direction a scaling rule votes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Directive {
    /// Add capacity.
    Out,
    /// Remove capacity.
    In,
    /// Leave the cluster as it is.
    None,
}

impl Directive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Out => "OUT",
            Directive::In => "IN",
            Directive::None => "NONE",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One polling cycle's worth of metrics for one cluster.
///
/// `metrics` maps metric names (e.g. `memory_maximum_utilization`) to the
/// values sampled for this cycle. Unknown extra fields on the wire are
/// ignored so payload producers can evolve independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPayload {
    #[serde(flatten)]
    pub cluster: ClusterRef,
    pub metrics: HashMap<String, f64>,
}

impl MetricsPayload {
    pub fn new(cluster: ClusterRef, metrics: HashMap<String, f64>) -> Self {
        Self { cluster, metrics }
    }
}
