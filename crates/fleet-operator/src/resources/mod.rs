//! Desired-state builders.
//!
//! Every function here is pure: it turns (defaulted) configuration into a
//! complete object description without contacting the cluster. Owner
//! references are attached later by the convergence engine.

use std::collections::BTreeMap;

use crate::constants::{defaults, labels, values};
use crate::crds::GlobalConfig;
use crate::error::{OperatorError, Result};

pub mod deployment_builder;
pub mod pvc_builder;
pub mod service_builder;

const SERVICE_TYPES: [&str; 3] = ["ClusterIP", "NodePort", "LoadBalancer"];
const PULL_POLICIES: [&str; 3] = ["Always", "IfNotPresent", "Never"];

/// Labels shared by a managed object, its selector and its pod template.
pub fn labels(app: &str, instance: &str, component: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (labels::APP.into(), app.into()),
        (labels::NAME.into(), app.into()),
        (labels::INSTANCE.into(), instance.into()),
        (labels::COMPONENT.into(), component.into()),
        (labels::PART_OF.into(), values::PART_OF.into()),
        (labels::MANAGED_BY.into(), values::MANAGED_BY.into()),
    ])
}

/// Resolve the Service type, rejecting values Kubernetes would not accept.
pub fn service_type(global: &GlobalConfig) -> Result<String> {
    resolve_choice(
        "spec.global.serviceType",
        &global.service_type,
        defaults::SERVICE_TYPE,
        &SERVICE_TYPES,
    )
}

/// Resolve the container image pull policy.
pub fn image_pull_policy(global: &GlobalConfig) -> Result<String> {
    resolve_choice(
        "spec.global.imagePullPolicy",
        &global.image_pull_policy,
        defaults::IMAGE_PULL_POLICY,
        &PULL_POLICIES,
    )
}

pub(crate) fn resolve_choice(field: &str, value: &str, default: &str, allowed: &[&str]) -> Result<String> {
    if value.is_empty() {
        return Ok(default.to_string());
    }
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(OperatorError::Config(format!(
            "{field} must be one of {}, got {value:?}",
            allowed.join(", ")
        )))
    }
}
