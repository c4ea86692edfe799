//! Folds live workload state into the ServiceFleet status.

use chrono::Utc;
use k8s_openapi::api::apps::v1::Deployment;

use crate::constants::{conditions, ports};
use crate::crds::{Condition, Phase, ServiceFleetStatus, ServiceKey, ServiceStatus};

/// In-cluster address of a service's HTTP port.
pub fn endpoint(key: ServiceKey, namespace: &str, cluster_domain: &str) -> String {
    format!("{key}.{namespace}.svc.{cluster_domain}:{}", ports::HTTP)
}

/// Status entry for one service from its live Deployment.
pub fn service_status(
    key: ServiceKey,
    deployment: &Deployment,
    namespace: &str,
    cluster_domain: &str,
) -> ServiceStatus {
    let observed = deployment.status.as_ref();
    let replicas = observed.and_then(|s| s.replicas).unwrap_or(0);
    let ready_replicas = observed.and_then(|s| s.ready_replicas).unwrap_or(0);

    ServiceStatus {
        name: key.as_str().to_string(),
        ready: replicas > 0 && ready_replicas == replicas,
        replicas,
        ready_replicas,
        endpoint: Some(endpoint(key, namespace, cluster_domain)),
    }
}

/// Insert or update a condition by type.
///
/// `lastTransitionTime` is set only when the condition is new or its status
/// changed.
pub fn upsert_condition(conditions: &mut Vec<Condition>, mut condition: Condition) {
    match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        Some(existing) => {
            condition.last_transition_time = if existing.status == condition.status {
                existing.last_transition_time.take()
            } else {
                Some(now())
            };
            *existing = condition;
        }
        None => {
            condition.last_transition_time = Some(now());
            conditions.push(condition);
        }
    }
}

/// Status written at the end of a successful pass.
pub fn ready(
    previous: Option<&ServiceFleetStatus>,
    services: Vec<ServiceStatus>,
    generation: Option<i64>,
) -> ServiceFleetStatus {
    let mut conditions = previous.map(|s| s.conditions.clone()).unwrap_or_default();
    upsert_condition(
        &mut conditions,
        ready_condition(
            "True",
            conditions::REASON_SERVICES_READY,
            conditions::MESSAGE_SERVICES_READY,
        ),
    );

    ServiceFleetStatus {
        phase: Some(Phase::Ready),
        conditions,
        services,
        observed_generation: generation,
    }
}

/// Phase and conditions written after a failed pass.
///
/// Only these two fields are patched, so the services list and
/// observedGeneration keep their last persisted values.
pub fn failed(previous: Option<&ServiceFleetStatus>, reason: &str, message: &str) -> serde_json::Value {
    let mut conditions = previous.map(|s| s.conditions.clone()).unwrap_or_default();
    upsert_condition(&mut conditions, ready_condition("False", reason, message));
    serde_json::json!({
        "phase": Phase::Failed,
        "conditions": conditions,
    })
}

/// Patch marking the first observation of a fleet.
pub fn initializing() -> serde_json::Value {
    serde_json::json!({ "phase": Phase::Initializing })
}

fn ready_condition(status: &str, reason: &str, message: &str) -> Condition {
    Condition {
        type_: conditions::READY.into(),
        status: status.into(),
        reason: Some(reason.into()),
        message: Some(message.into()),
        last_transition_time: None,
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}
