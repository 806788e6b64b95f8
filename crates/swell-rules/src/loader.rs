//! Loading and validating rule configurations.
//!
//! Rule sets are data, not code. Two formats are accepted: a JSON array of
//! rule records (the shape the upstream rule files use) and a TOML document
//! of `[[rules]]` tables. Every structural problem is caught here, at load
//! time; a rule set that loads cleanly never fails during evaluation.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{RuleError, RuleResult};
use crate::rule::{ConditionNode, ConditionSet, Rule};

/// Top-level shape of a TOML rules document.
#[derive(Debug, Deserialize)]
struct RulesDocument {
    rules: Vec<Rule>,
}

/// Load and validate a rules file, dispatching on its extension.
pub fn load_rules(path: &Path) -> RuleResult<Vec<Rule>> {
    let content = std::fs::read_to_string(path)?;
    let rules = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_rules_json(&content)?,
        Some("toml") => parse_rules_toml(&content)?,
        other => return Err(RuleError::UnsupportedFormat(other.unwrap_or("").to_string())),
    };
    debug!(rules = rules.len(), path = %path.display(), "rules loaded");
    Ok(rules)
}

/// Parse and validate a JSON array of rule records.
pub fn parse_rules_json(content: &str) -> RuleResult<Vec<Rule>> {
    let rules: Vec<Rule> = serde_json::from_str(content)?;
    validate_rules(&rules)?;
    Ok(rules)
}

/// Parse and validate a TOML document of `[[rules]]` tables.
pub fn parse_rules_toml(content: &str) -> RuleResult<Vec<Rule>> {
    let document: RulesDocument = toml::from_str(content)?;
    validate_rules(&document.rules)?;
    Ok(document.rules)
}

/// Structural validation applied to every rule set, whatever its source.
///
/// Rejects empty rule names, duplicate names, and empty condition groups
/// at any nesting depth. An empty `all` group would be vacuously true and
/// fire on every cycle; refusing it at load time is cheaper than debugging
/// a cluster that never stops scaling.
pub fn validate_rules(rules: &[Rule]) -> RuleResult<()> {
    let mut seen = HashSet::new();
    for rule in rules {
        if rule.name.trim().is_empty() {
            return Err(RuleError::EmptyRuleName);
        }
        if !seen.insert(rule.name.as_str()) {
            return Err(RuleError::DuplicateRule(rule.name.clone()));
        }
        check_groups(&rule.name, &rule.conditions)?;
    }
    Ok(())
}

fn check_groups(rule: &str, set: &ConditionSet) -> RuleResult<()> {
    if set.nodes().is_empty() {
        return Err(RuleError::EmptyConditionGroup(rule.to_string()));
    }
    for node in set.nodes() {
        if let ConditionNode::Group(group) = node {
            check_groups(rule, group)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use swell_core::Directive;

    const SAMPLE_JSON: &str = r#"[
        {
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
        }
    ]"#;

    const SAMPLE_TOML: &str = r#"
        [[rules]]
        name = "cpu-high-average-utilization"

        [rules.conditions]
        all = [
            { fact = "cpu_average_utilization", operator = "greaterThan", value = 70.0 },
            { fact = "cpu_maximum_utilization", operator = "greaterThan", value = 80.0 },
        ]

        [rules.event]
        type = "OUT"

        [rules.event.params]
        message = "high average CPU utilization"
        scalingMetrics = ["cpu_average_utilization"]
    "#;

    #[test]
    fn parses_json_rule_array() {
        let rules = parse_rules_json(SAMPLE_JSON).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "memory-high-maximum-utilization");
        assert_eq!(rules[0].event.directive, Directive::Out);
        // Integer thresholds in JSON land as floats.
        let ConditionNode::Leaf(first) = &rules[0].conditions.nodes()[0] else {
            panic!("expected leaf condition");
        };
        assert_eq!(first.value, 80.0);
    }

    #[test]
    fn parses_toml_rule_tables() {
        let rules = parse_rules_toml(SAMPLE_TOML).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "cpu-high-average-utilization");
        assert_eq!(rules[0].conditions.nodes().len(), 2);
    }

    #[test]
    fn load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("rules.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(SAMPLE_JSON.as_bytes())
            .unwrap();
        assert_eq!(load_rules(&json_path).unwrap().len(), 1);

        let toml_path = dir.path().join("rules.toml");
        std::fs::File::create(&toml_path)
            .unwrap()
            .write_all(SAMPLE_TOML.as_bytes())
            .unwrap();
        assert_eq!(load_rules(&toml_path).unwrap().len(), 1);

        let yaml_path = dir.path().join("rules.yaml");
        std::fs::File::create(&yaml_path).unwrap();
        assert!(matches!(
            load_rules(&yaml_path),
            Err(RuleError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let json = r#"[{
            "name": "bad",
            "conditions": { "all": [
                { "fact": "x", "operator": "almostEqual", "value": 1 }
            ] },
            "event": { "type": "OUT", "params": { "message": "m", "scalingMetrics": [] } }
        }]"#;

        assert!(matches!(
            parse_rules_json(json),
            Err(RuleError::ParseJson(_))
        ));
    }

    #[test]
    fn missing_field_is_rejected() {
        // No "value" on the condition.
        let json = r#"[{
            "name": "bad",
            "conditions": { "all": [ { "fact": "x", "operator": "greaterThan" } ] },
            "event": { "type": "OUT", "params": { "message": "m", "scalingMetrics": [] } }
        }]"#;

        assert!(parse_rules_json(json).is_err());
    }

    #[test]
    fn empty_condition_group_is_rejected() {
        let json = r#"[{
            "name": "vacuous",
            "conditions": { "all": [] },
            "event": { "type": "OUT", "params": { "message": "m", "scalingMetrics": [] } }
        }]"#;

        assert!(matches!(
            parse_rules_json(json),
            Err(RuleError::EmptyConditionGroup(name)) if name == "vacuous"
        ));
    }

    #[test]
    fn nested_empty_group_is_rejected() {
        let json = r#"[{
            "name": "nested",
            "conditions": { "all": [
                { "fact": "x", "operator": "greaterThan", "value": 1 },
                { "any": [] }
            ] },
            "event": { "type": "OUT", "params": { "message": "m", "scalingMetrics": [] } }
        }]"#;

        assert!(matches!(
            parse_rules_json(json),
            Err(RuleError::EmptyConditionGroup(_))
        ));
    }

    #[test]
    fn duplicate_rule_names_are_rejected() {
        let rules = parse_rules_json(SAMPLE_JSON).unwrap();
        let doubled: Vec<Rule> = rules.iter().chain(rules.iter()).cloned().collect();

        assert!(matches!(
            validate_rules(&doubled),
            Err(RuleError::DuplicateRule(name)) if name == "memory-high-maximum-utilization"
        ));
    }

    #[test]
    fn blank_rule_name_is_rejected() {
        let json = r#"[{
            "name": "   ",
            "conditions": { "all": [ { "fact": "x", "operator": "greaterThan", "value": 1 } ] },
            "event": { "type": "OUT", "params": { "message": "m", "scalingMetrics": [] } }
        }]"#;

        assert!(matches!(parse_rules_json(json), Err(RuleError::EmptyRuleName)));
    }

    #[test]
    fn empty_rule_list_is_valid() {
        assert!(parse_rules_json("[]").unwrap().is_empty());
    }
}
