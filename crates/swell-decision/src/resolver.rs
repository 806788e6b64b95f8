//! Conflict resolution across fired scaling events.

use serde::{Deserialize, Serialize};
use swell_core::Directive;
use swell_rules::ScalingEvent;
use tracing::debug;

/// The single recommendation produced for one evaluation cycle.
///
/// `events` holds every fired event that voted for the winning directive,
/// in rule evaluation order, so the decision can be audited after the fact.
/// Events for losing directives are dropped here and only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub directive: Directive,
    pub events: Vec<ScalingEvent>,
}

impl Recommendation {
    /// The no-op recommendation: nothing fired, nothing to do.
    pub fn none() -> Self {
        Self {
            directive: Directive::None,
            events: Vec::new(),
        }
    }
}

/// Resolve the fired events of one cycle into exactly one recommendation.
///
/// Directive precedence is OUT > IN > NONE. Scale-out wins over scale-in
/// whenever both fire, so conflicting rules can never starve a cluster
/// that is under load; the cost of a spurious scale-out is money, the cost
/// of a missed one is an outage. Zero events resolve to NONE.
pub fn resolve(events: Vec<ScalingEvent>) -> Recommendation {
    let Some(winner) = events
        .iter()
        .map(|event| event.directive)
        .max_by_key(|directive| precedence(*directive))
    else {
        return Recommendation::none();
    };

    let events: Vec<ScalingEvent> = events
        .into_iter()
        .filter(|event| event.directive == winner)
        .collect();

    debug!(directive = %winner, events = events.len(), "recommendation resolved");
    Recommendation {
        directive: winner,
        events,
    }
}

fn precedence(directive: Directive) -> u8 {
    match directive {
        Directive::Out => 2,
        Directive::In => 1,
        Directive::None => 0,
    }
}
