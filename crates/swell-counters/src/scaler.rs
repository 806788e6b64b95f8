//! Well-known counters recorded around scaling actions.
//!
//! Every outcome counter carries the cluster identity plus the direction
//! that was attempted, so dashboards can split scale-outs from scale-ins.

use swell_core::{ClusterRef, Directive};
use tracing::warn;

use crate::attributes::{self, AttributeSet};
use crate::registry::{CounterDefinition, CounterRegistry};

pub const SCALING_SUCCESS: &str = "scaler/scaling-success";
pub const SCALING_FAILED: &str = "scaler/scaling-failed";
pub const SCALING_DENIED: &str = "scaler/scaling-denied";

/// Definitions for every scaler counter, ready for registration.
pub fn definitions() -> Vec<CounterDefinition> {
    vec![
        CounterDefinition::new(
            SCALING_SUCCESS,
            "The number of scaling actions that succeeded",
        ),
        CounterDefinition::new(SCALING_FAILED, "The number of scaling actions that failed"),
        CounterDefinition::new(
            SCALING_DENIED,
            "The number of scaling actions declined by the executor",
        ),
    ]
}

/// Count one scaling action the executor performed.
pub async fn inc_scaling_success(
    registry: &CounterRegistry,
    cluster: &ClusterRef,
    direction: Directive,
) {
    record(registry, SCALING_SUCCESS, cluster, direction).await;
}

/// Count one scaling action that errored.
pub async fn inc_scaling_failed(
    registry: &CounterRegistry,
    cluster: &ClusterRef,
    direction: Directive,
) {
    record(registry, SCALING_FAILED, cluster, direction).await;
}

/// Count one scaling action the executor declined to perform.
pub async fn inc_scaling_denied(
    registry: &CounterRegistry,
    cluster: &ClusterRef,
    direction: Directive,
) {
    record(registry, SCALING_DENIED, cluster, direction).await;
}

async fn record(
    registry: &CounterRegistry,
    name: &str,
    cluster: &ClusterRef,
    direction: Directive,
) {
    let attrs =
        AttributeSet::for_cluster(cluster).with(attributes::SCALING_DIRECTION, direction.as_str());
    if let Err(e) = registry.increment(name, attrs).await {
        warn!(counter = name, error = %e, "counter increment dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::RecordingPublisher;
    use std::sync::Arc;

    #[tokio::test]
    async fn outcome_counters_split_by_direction() {
        let publisher = Arc::new(RecordingPublisher::new());
        let registry = CounterRegistry::new(publisher.clone());
        registry.register(definitions()).await.unwrap();

        let cluster = ClusterRef::new("proj-1", "cache-a");
        inc_scaling_success(&registry, &cluster, Directive::Out).await;
        inc_scaling_success(&registry, &cluster, Directive::Out).await;
        inc_scaling_success(&registry, &cluster, Directive::In).await;
        inc_scaling_denied(&registry, &cluster, Directive::In).await;

        registry.flush().await.unwrap();

        let out = AttributeSet::for_cluster(&cluster).with(attributes::SCALING_DIRECTION, "OUT");
        let inward = AttributeSet::for_cluster(&cluster).with(attributes::SCALING_DIRECTION, "IN");
        assert_eq!(publisher.exported_total(SCALING_SUCCESS, &out), 2);
        assert_eq!(publisher.exported_total(SCALING_SUCCESS, &inward), 1);
        assert_eq!(publisher.exported_total(SCALING_DENIED, &inward), 1);
    }
}
