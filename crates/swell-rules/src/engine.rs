//! The rule evaluation engine.

use tracing::debug;

use crate::facts::FactSet;
use crate::rule::{MetricValue, Rule, ScalingEvent};

/// Evaluates a fixed, ordered rule set against per-cycle fact sets.
///
/// Evaluation is exhaustive and independent: every rule is tested against
/// the same facts, and one rule firing never suppresses another. Conflict
/// resolution between the fired events happens downstream, not here.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    rules: Vec<Rule>,
}

impl RulesEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate every rule against `facts` and collect the fired events.
    ///
    /// Events come back in rule order. The function is pure: no state is
    /// carried between cycles, so identical facts always produce identical
    /// events.
    pub fn evaluate(&self, facts: &FactSet) -> Vec<ScalingEvent> {
        let mut events = Vec::new();
        for rule in &self.rules {
            if rule.conditions.is_satisfied(facts) {
                debug!(rule = %rule.name, directive = %rule.event.directive, "rule fired");
                events.push(fired_event(rule, facts));
            }
        }
        events
    }
}

/// Build the event for a fired rule, capturing the current values of its
/// scaling metrics. A metric missing from the facts is carried as `None`,
/// never dropped, so the event always lists every declared metric.
fn fired_event(rule: &Rule, facts: &FactSet) -> ScalingEvent {
    let metrics = rule
        .event
        .params
        .scaling_metrics
        .iter()
        .map(|name| MetricValue {
            name: name.clone(),
            value: facts.get(name),
        })
        .collect();

    ScalingEvent {
        rule: rule.name.clone(),
        directive: rule.event.directive,
        message: rule.event.params.message.clone(),
        metrics,
    }
}
