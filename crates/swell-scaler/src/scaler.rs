//! Scaler — one decision cycle per metrics payload.
//!
//! Turns a polled payload into facts, runs the rule engine, resolves the
//! fired events into a recommendation, and hands actionable
//! recommendations to a callback. The actual resizing is performed by that
//! callback, never here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use swell_core::{ClusterRef, Directive, MetricsPayload};
use swell_counters::{CounterRegistry, scaler as outcome};
use swell_decision::{Recommendation, resolve};
use swell_rules::{FactSet, RulesEngine};

/// Callback type for performing scaling actions.
///
/// Called with the cluster identity and the resolved recommendation.
/// `Ok(true)` means the action was performed, `Ok(false)` that the
/// executor declined it (cooldown window, size already at a bound), and
/// `Err` that it was attempted and failed. The future must own its data;
/// the borrows do not outlive the call.
pub type ExecuteCallback = Arc<dyn Fn(&ClusterRef, &Recommendation) -> BoxFuture + Send + Sync>;

type BoxFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<bool>> + Send>>;

/// Drives the decision core for one cluster at a time.
pub struct Scaler {
    engine: RulesEngine,
    counters: CounterRegistry,
    /// Callback to perform scaling.
    execute_fn: Option<ExecuteCallback>,
}

impl Scaler {
    /// Create a scaler over a rule engine and a counter registry.
    pub fn new(engine: RulesEngine, counters: CounterRegistry) -> Self {
        Self {
            engine,
            counters,
            execute_fn: None,
        }
    }

    /// Set the callback used to perform scaling actions.
    pub fn with_execute_fn(mut self, f: ExecuteCallback) -> Self {
        self.execute_fn = Some(f);
        self
    }

    /// The rules this scaler evaluates, in evaluation order.
    pub fn rules(&self) -> &[swell_rules::Rule] {
        self.engine.rules()
    }

    /// Handle one polled metrics payload end to end.
    ///
    /// Always produces a recommendation: missing facts, zero fired rules,
    /// executor errors, and counter failures all degrade gracefully
    /// instead of aborting the cycle.
    pub async fn handle(&self, payload: &MetricsPayload) -> Recommendation {
        let facts = FactSet::from(payload.metrics.clone());
        let events = self.engine.evaluate(&facts);
        let recommendation = resolve(events);

        info!(
            cluster = %payload.cluster,
            directive = %recommendation.directive,
            events = recommendation.events.len(),
            "evaluation cycle resolved"
        );

        if recommendation.directive != Directive::None {
            self.execute(&payload.cluster, &recommendation).await;
        }

        recommendation
    }

    async fn execute(&self, cluster: &ClusterRef, recommendation: &Recommendation) {
        let Some(execute_fn) = &self.execute_fn else {
            debug!(cluster = %cluster, "no scaling executor configured");
            return;
        };

        match execute_fn(cluster, recommendation).await {
            Ok(true) => {
                debug!(cluster = %cluster, directive = %recommendation.directive, "scaling action performed");
                outcome::inc_scaling_success(&self.counters, cluster, recommendation.directive)
                    .await;
            }
            Ok(false) => {
                info!(cluster = %cluster, directive = %recommendation.directive, "scaling action declined by executor");
                outcome::inc_scaling_denied(&self.counters, cluster, recommendation.directive)
                    .await;
            }
            Err(e) => {
                warn!(
                    cluster = %cluster,
                    directive = %recommendation.directive,
                    error = %e,
                    "scaling action failed"
                );
                outcome::inc_scaling_failed(&self.counters, cluster, recommendation.directive)
                    .await;
            }
        }
    }
}
