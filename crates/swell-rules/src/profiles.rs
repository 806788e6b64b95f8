//! Built-in scaling profiles.
//!
//! A profile is a named, code-defined rule set covering the common cases so
//! deployments without a custom rules file still get sensible behavior.
//! Thresholds mirror the upstream profile tree: scale out early, scale in
//! only when both the peak and the average have come down.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use swell_core::Directive;

use crate::condition::{ComparisonOp, Condition};
use crate::error::RuleError;
use crate::rule::{ConditionNode, ConditionSet, EventParams, EventSpec, Rule};

/// Which built-in rule set to evaluate for a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingProfile {
    Cpu,
    Memory,
    CpuAndMemory,
}

impl ScalingProfile {
    /// The rules this profile evaluates, in evaluation order.
    pub fn rules(self) -> Vec<Rule> {
        match self {
            ScalingProfile::Cpu => cpu_rules(),
            ScalingProfile::Memory => memory_rules(),
            ScalingProfile::CpuAndMemory => {
                let mut rules = cpu_rules();
                rules.extend(memory_rules());
                rules
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalingProfile::Cpu => "cpu",
            ScalingProfile::Memory => "memory",
            ScalingProfile::CpuAndMemory => "cpu-and-memory",
        }
    }
}

impl fmt::Display for ScalingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalingProfile {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(ScalingProfile::Cpu),
            "memory" => Ok(ScalingProfile::Memory),
            "cpu-and-memory" | "cpu_and_memory" => Ok(ScalingProfile::CpuAndMemory),
            other => Err(RuleError::UnknownProfile(other.to_string())),
        }
    }
}

/// Memory profile: scale out on sustained high peak utilization, scale in
/// once both the peak and the average have dropped.
pub fn memory_rules() -> Vec<Rule> {
    vec![
        rule(
            "memory-high-maximum-utilization",
            ConditionSet::All(vec![
                leaf("memory_maximum_utilization", ComparisonOp::GreaterThan, 80.0),
                leaf("memory_average_utilization", ComparisonOp::GreaterThan, 50.0),
            ]),
            Directive::Out,
            "high maximum memory utilization",
            &["memory_maximum_utilization"],
        ),
        rule(
            "memory-low-maximum-utilization",
            ConditionSet::All(vec![
                leaf("memory_maximum_utilization", ComparisonOp::LessThan, 60.0),
                leaf("memory_average_utilization", ComparisonOp::LessThan, 40.0),
            ]),
            Directive::In,
            "low maximum memory utilization",
            &["memory_maximum_utilization"],
        ),
    ]
}

/// CPU profile: same shape as the memory profile, driven by the average
/// with the peak as a guard.
pub fn cpu_rules() -> Vec<Rule> {
    vec![
        rule(
            "cpu-high-average-utilization",
            ConditionSet::All(vec![
                leaf("cpu_average_utilization", ComparisonOp::GreaterThan, 70.0),
                leaf("cpu_maximum_utilization", ComparisonOp::GreaterThan, 80.0),
            ]),
            Directive::Out,
            "high average CPU utilization",
            &["cpu_average_utilization"],
        ),
        rule(
            "cpu-low-average-utilization",
            ConditionSet::All(vec![
                leaf("cpu_average_utilization", ComparisonOp::LessThan, 30.0),
                leaf("cpu_maximum_utilization", ComparisonOp::LessThan, 50.0),
            ]),
            Directive::In,
            "low average CPU utilization",
            &["cpu_average_utilization"],
        ),
    ]
}

fn leaf(fact: &str, operator: ComparisonOp, value: f64) -> ConditionNode {
    ConditionNode::Leaf(Condition::new(fact, operator, value))
}

fn rule(
    name: &str,
    conditions: ConditionSet,
    directive: Directive,
    message: &str,
    scaling_metrics: &[&str],
) -> Rule {
    Rule {
        name: name.to_string(),
        conditions,
        event: EventSpec {
            directive,
            params: EventParams {
                message: message.to_string(),
                scaling_metrics: scaling_metrics.iter().map(|m| m.to_string()).collect(),
            },
        },
    }
}
