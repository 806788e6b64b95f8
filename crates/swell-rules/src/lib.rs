//! swell-rules — the scaling rule engine.
//!
//! Rules are declarative data: a named boolean composition of threshold
//! conditions over polled metrics (facts), paired with the scaling event to
//! emit when the composition holds. The engine evaluates every rule of a
//! set against the facts of one cycle and collects the fired events; it
//! never mutates state and never picks a winner. Resolving conflicting
//! events into a single recommendation is swell-decision's job.
//!
//! ```text
//! rules file / profile ──> loader ──> RulesEngine
//!                                          │ evaluate(FactSet)
//!                                          ▼
//!                                   Vec<ScalingEvent>
//! ```

pub mod condition;
pub mod engine;
pub mod error;
pub mod facts;
pub mod loader;
pub mod profiles;
pub mod rule;

pub use condition::{ComparisonOp, Condition};
pub use engine::RulesEngine;
pub use error::{RuleError, RuleResult};
pub use facts::FactSet;
pub use loader::{load_rules, parse_rules_json, parse_rules_toml, validate_rules};
pub use profiles::ScalingProfile;
pub use rule::{ConditionNode, ConditionSet, EventParams, EventSpec, MetricValue, Rule, ScalingEvent};
