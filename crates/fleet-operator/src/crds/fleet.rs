use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{Condition, ResourceRequirements};
use super::service_key::ServiceKey;

/// Desired state of a fleet of demo services and their shared database.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "fleet.io",
    version = "v1",
    kind = "ServiceFleet",
    namespaced,
    status = "ServiceFleetStatus",
    shortname = "sfleet",
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Ready Services","type":"string","jsonPath":".status.services[?(@.ready==true)].name"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFleetSpec {
    /// Per-service configuration. Keys missing from the map are disabled.
    #[serde(default)]
    pub services: BTreeMap<ServiceKey, ServiceConfig>,

    /// Shared database for the services that need one.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Overrides applied to every managed object.
    #[serde(default)]
    pub global: GlobalConfig,
}

/// Configuration of a single service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Whether the service is deployed.
    #[serde(default)]
    pub enabled: bool,

    /// Replica count, 1 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Container image, the service name when empty.
    #[serde(default)]
    pub image: String,

    /// Image tag, "latest" when empty.
    #[serde(default)]
    pub tag: String,

    /// Resource limits and requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

/// Configuration of the shared database.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Database engine. Only "mysql" is supported.
    #[serde(default, rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub tag: String,

    /// Requested volume size (e.g. "10Gi").
    #[serde(default)]
    pub storage_size: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Schema created on first start and handed to dependent services.
    #[serde(default)]
    pub database_name: String,

    /// Secret holding `root-password`, `username` and `password`.
    #[serde(default)]
    pub credentials_secret: String,
}

/// Cross-cutting settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Target namespace for managed objects. Must match the ServiceFleet's own
    /// namespace, since owner references cannot cross namespaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Image pull policy: Always, IfNotPresent, Never.
    #[serde(default)]
    pub image_pull_policy: String,

    /// Service type: ClusterIP, NodePort, LoadBalancer.
    #[serde(default)]
    pub service_type: String,

    #[serde(default)]
    pub ingress_enabled: bool,

    #[serde(default)]
    pub ingress_host: String,
}

/// Coarse lifecycle marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Phase {
    Initializing,
    Ready,
    Failed,
}

/// Observed state of a single service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    pub ready: bool,
    pub replicas: i32,
    pub ready_replicas: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Status for ServiceFleet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFleetStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,

    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// One entry per enabled service, in reconcile order.
    #[serde(default)]
    pub services: Vec<ServiceStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl ServiceFleetSpec {
    /// Every known service with its configuration, in reconcile order.
    /// Services without an entry get a disabled default.
    pub fn service_configs(&self) -> impl Iterator<Item = (ServiceKey, ServiceConfig)> + '_ {
        ServiceKey::ALL.into_iter().map(move |key| {
            let config = self.services.get(&key).cloned().unwrap_or_default();
            (key, config)
        })
    }
}

impl ServiceFleet {
    /// Current phase, `None` until the first pass has been observed.
    pub fn phase(&self) -> Option<Phase> {
        self.status.as_ref().and_then(|s| s.phase)
    }
}
