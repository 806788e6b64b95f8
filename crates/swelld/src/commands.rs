//! Command bodies for swelld.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use swell_core::{ClusterRef, MetricsPayload};
use swell_counters::{CounterRegistry, LogPublisher, poller, scaler as outcome};
use swell_decision::Recommendation;
use swell_rules::{RulesEngine, ScalingProfile, load_rules};
use swell_scaler::Scaler;

/// Evaluate every payload in `facts_path` and print the recommendations.
///
/// Rule problems are fatal before anything is evaluated. Payload problems
/// are not: a malformed entry is skipped (and counted), the rest of the
/// file still gets its recommendations.
pub async fn evaluate(
    facts_path: &Path,
    rules_path: Option<&Path>,
    profile: ScalingProfile,
    flush_timeout: Duration,
) -> anyhow::Result<()> {
    let rules = match rules_path {
        Some(path) => load_rules(path)
            .with_context(|| format!("loading rules from {}", path.display()))?,
        None => profile.rules(),
    };
    info!(rules = rules.len(), "rule set loaded");

    let registry = CounterRegistry::new(Arc::new(LogPublisher));
    // Registration runs in the background; increments issued before it
    // completes park on the readiness gate.
    let registration = tokio::spawn({
        let registry = registry.clone();
        async move {
            let mut definitions = poller::definitions();
            definitions.extend(outcome::definitions());
            if let Err(e) = registry.register(definitions).await {
                warn!(error = %e, "counter registration failed");
            }
        }
    });

    let scaler = Scaler::new(RulesEngine::new(rules), registry.clone());

    let result = evaluate_file(&scaler, &registry, facts_path).await;
    match &result {
        Ok(_) => poller::inc_requests_success(&registry).await,
        Err(_) => poller::inc_requests_failed(&registry).await,
    }

    let _ = registration.await;

    // Telemetry must not hold up exit indefinitely.
    match tokio::time::timeout(flush_timeout, registry.flush()).await {
        Ok(Ok(())) => info!("counters flushed"),
        Ok(Err(e)) => warn!(error = %e, "counter flush failed"),
        Err(_) => warn!(timeout_secs = flush_timeout.as_secs(), "counter flush timed out"),
    }

    let (recommendations, single) = result?;
    // Mirror the input shape, except when the lone entry was skipped.
    let rendered = match (&recommendations[..], single) {
        ([one], true) => serde_json::to_string_pretty(one)?,
        _ => serde_json::to_string_pretty(&recommendations)?,
    };
    println!("{rendered}");
    Ok(())
}

/// Validate a rules file and exit.
pub fn check(path: &Path) -> anyhow::Result<()> {
    let rules =
        load_rules(path).with_context(|| format!("loading rules from {}", path.display()))?;
    info!(rules = rules.len(), path = %path.display(), "rules file is valid");
    println!("OK: {} rules", rules.len());
    Ok(())
}

/// Read a payload file and evaluate each entry. Returns the resolved
/// recommendations and whether the file held a single object.
async fn evaluate_file(
    scaler: &Scaler,
    registry: &CounterRegistry,
    path: &Path,
) -> anyhow::Result<(Vec<Recommendation>, bool)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading payloads from {}", path.display()))?;
    let (entries, single) = parse_payload_entries(&content)?;
    let recommendations = evaluate_entries(scaler, registry, entries).await;
    Ok((recommendations, single))
}

/// Split a payload document into its entries. A single object is treated
/// as a one-element batch.
fn parse_payload_entries(content: &str) -> anyhow::Result<(Vec<serde_json::Value>, bool)> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("payload file is not valid JSON")?;
    Ok(match value {
        serde_json::Value::Array(entries) => (entries, false),
        other => (vec![other], true),
    })
}

/// Evaluate decoded payload entries in order, recording per-cluster
/// polling outcomes along the way.
async fn evaluate_entries(
    scaler: &Scaler,
    registry: &CounterRegistry,
    entries: Vec<serde_json::Value>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<MetricsPayload>(entry.clone()) {
            Ok(payload) => {
                let cluster = payload.cluster.clone();
                recommendations.push(scaler.handle(&payload).await);
                poller::inc_polling_success(registry, &cluster).await;
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed metrics payload");
                // The failure can only be attributed if the entry at least
                // identifies its cluster.
                if let Ok(cluster) = serde_json::from_value::<ClusterRef>(entry) {
                    poller::inc_polling_failed(registry, &cluster).await;
                }
            }
        }
    }
    recommendations
}
