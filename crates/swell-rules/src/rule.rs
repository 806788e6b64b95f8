//! Rules — named boolean compositions of conditions plus the event they emit.

use serde::{Deserialize, Serialize};
use swell_core::Directive;

use crate::condition::Condition;
use crate::facts::FactSet;

/// A node in a condition tree: either a nested group or a leaf comparison.
///
/// Untagged on the wire. A group is an object with an `all` or `any` key,
/// a leaf is an object with `fact`/`operator`/`value`; the two shapes never
/// overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Group(ConditionSet),
    Leaf(Condition),
}

impl ConditionNode {
    pub fn is_satisfied(&self, facts: &FactSet) -> bool {
        match self {
            ConditionNode::Group(group) => group.is_satisfied(facts),
            ConditionNode::Leaf(condition) => condition.evaluate(facts),
        }
    }
}

/// Boolean composition over condition nodes.
///
/// `all` is conjunction, `any` is disjunction. Groups nest to arbitrary
/// depth; the tree is owned, so cycles cannot be expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionSet {
    All(Vec<ConditionNode>),
    Any(Vec<ConditionNode>),
}

impl ConditionSet {
    /// Whether the composition is satisfied by `facts`.
    ///
    /// `all` stops at the first unsatisfied child, `any` at the first
    /// satisfied one. Children are pure, so short-circuiting is invisible
    /// to the outcome.
    pub fn is_satisfied(&self, facts: &FactSet) -> bool {
        match self {
            ConditionSet::All(nodes) => nodes.iter().all(|node| node.is_satisfied(facts)),
            ConditionSet::Any(nodes) => nodes.iter().any(|node| node.is_satisfied(facts)),
        }
    }

    /// Direct children of this group.
    pub fn nodes(&self) -> &[ConditionNode] {
        match self {
            ConditionSet::All(nodes) | ConditionSet::Any(nodes) => nodes,
        }
    }
}

/// Event template attached to a rule, emitted when the rule fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    /// The scaling directive this rule votes for.
    #[serde(rename = "type")]
    pub directive: Directive,
    pub params: EventParams,
}

/// Operator-facing payload of a scaling event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParams {
    /// Why the rule fired, in plain words.
    pub message: String,
    /// Names of the metrics that drive this rule.
    pub scaling_metrics: Vec<String>,
}

/// A named scaling rule: a condition tree and the event to emit when the
/// tree is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub conditions: ConditionSet,
    pub event: EventSpec,
}

/// Resolved value of one contributing metric at firing time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub name: String,
    /// `None` when the metric was absent from the fact set.
    pub value: Option<f64>,
}

/// Emitted by the engine for every rule whose conditions are satisfied.
///
/// Carries the rule's directive and message plus the values its scaling
/// metrics held at firing time, so a recommendation can be audited without
/// re-running the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingEvent {
    /// Name of the rule that fired.
    pub rule: String,
    pub directive: Directive,
    pub message: String,
    pub metrics: Vec<MetricValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ComparisonOp;

    fn leaf(fact: &str, operator: ComparisonOp, value: f64) -> ConditionNode {
        ConditionNode::Leaf(Condition::new(fact, operator, value))
    }

    fn facts(pairs: &[(&str, f64)]) -> FactSet {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn all_requires_every_child() {
        let set = ConditionSet::All(vec![
            leaf("memory_maximum_utilization", ComparisonOp::GreaterThan, 80.0),
            leaf("memory_average_utilization", ComparisonOp::GreaterThan, 50.0),
        ]);

        assert!(set.is_satisfied(&facts(&[
            ("memory_maximum_utilization", 85.0),
            ("memory_average_utilization", 60.0),
        ])));
        assert!(!set.is_satisfied(&facts(&[
            ("memory_maximum_utilization", 85.0),
            ("memory_average_utilization", 40.0),
        ])));
    }

    #[test]
    fn any_requires_one_child() {
        let set = ConditionSet::Any(vec![
            leaf("cpu_average_utilization", ComparisonOp::GreaterThan, 70.0),
            leaf("memory_average_utilization", ComparisonOp::GreaterThan, 70.0),
        ]);

        assert!(set.is_satisfied(&facts(&[
            ("cpu_average_utilization", 20.0),
            ("memory_average_utilization", 90.0),
        ])));
        assert!(!set.is_satisfied(&facts(&[
            ("cpu_average_utilization", 20.0),
            ("memory_average_utilization", 30.0),
        ])));
    }

    #[test]
    fn groups_nest() {
        // all[ cpu > 70, any[ mem_max > 80, mem_avg > 60 ] ]
        let set = ConditionSet::All(vec![
            leaf("cpu_average_utilization", ComparisonOp::GreaterThan, 70.0),
            ConditionNode::Group(ConditionSet::Any(vec![
                leaf("memory_maximum_utilization", ComparisonOp::GreaterThan, 80.0),
                leaf("memory_average_utilization", ComparisonOp::GreaterThan, 60.0),
            ])),
        ]);

        assert!(set.is_satisfied(&facts(&[
            ("cpu_average_utilization", 75.0),
            ("memory_maximum_utilization", 85.0),
            ("memory_average_utilization", 10.0),
        ])));
        assert!(!set.is_satisfied(&facts(&[
            ("cpu_average_utilization", 75.0),
            ("memory_maximum_utilization", 10.0),
            ("memory_average_utilization", 10.0),
        ])));
        // Outer all fails even though the inner any holds.
        assert!(!set.is_satisfied(&facts(&[
            ("cpu_average_utilization", 10.0),
            ("memory_maximum_utilization", 85.0),
        ])));
    }

    #[test]
    fn rule_round_trips_through_json() {
        let json = r#"{
            "name": "memory-high-maximum-utilization",
            "conditions": {
                "all": [
                    { "fact": "memory_maximum_utilization", "operator": "greaterThan", "value": 80 },
                    { "fact": "memory_average_utilization", "operator": "greaterThan", "value": 50 }
                ]
            },
            "event": {
                "type": "OUT",
                "params": {
                    "message": "high maximum memory utilization",
                    "scalingMetrics": ["memory_maximum_utilization"]
                }
            }
        }"#;

        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.name, "memory-high-maximum-utilization");
        assert_eq!(rule.event.directive, Directive::Out);
        assert_eq!(
            rule.event.params.scaling_metrics,
            vec!["memory_maximum_utilization"]
        );
        assert_eq!(rule.conditions.nodes().len(), 2);

        let rendered = serde_json::to_string(&rule).unwrap();
        let reparsed: Rule = serde_json::from_str(&rendered).unwrap();
        assert_eq!(reparsed, rule);
    }

    #[test]
    fn nested_group_parses_from_json() {
        let json = r#"{
            "any": [
                { "fact": "cpu_average_utilization", "operator": "greaterThan", "value": 90 },
                { "all": [
                    { "fact": "cpu_average_utilization", "operator": "greaterThan", "value": 70 },
                    { "fact": "memory_average_utilization", "operator": "greaterThan", "value": 70 }
                ] }
            ]
        }"#;

        let set: ConditionSet = serde_json::from_str(json).unwrap();
        let ConditionSet::Any(nodes) = &set else {
            panic!("expected any group");
        };
        assert!(matches!(&nodes[0], ConditionNode::Leaf(_)));
        assert!(matches!(&nodes[1], ConditionNode::Group(ConditionSet::All(_))));
    }
}
