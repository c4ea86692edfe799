//! In-memory [`ObjectStore`] used to drive reconciliation passes without a
//! cluster.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentStatus};
use kube::{Resource, ResourceExt};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use fleet_operator::config::OperatorConfig;
use fleet_operator::crds::{ServiceFleet, ServiceFleetSpec, ServiceFleetStatus};
use fleet_operator::reconciler::Reconciler;
use fleet_operator::store::{Managed, ObjectStore};
use fleet_operator::{OperatorError, Result};

pub const NAMESPACE: &str = "shop";
pub const FLEET_UID: &str = "0b9d3c0e-fleet";

type Key = (String, String, String);

#[derive(Default)]
struct State {
    objects: BTreeMap<Key, Value>,
    status: Value,
    status_patches: Vec<Value>,
    creates: Vec<Key>,
    replaces: Vec<Key>,
    next_uid: u64,
    fail_create: Option<(String, String)>,
    hidden: Option<(String, String)>,
    get_latency: Option<Duration>,
}

/// Shared handle; clones see the same objects.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

fn key<K: Managed>(namespace: &str, name: &str) -> Key {
    (K::kind(&()).to_string(), namespace.to_string(), name.to_string())
}

fn api_error(code: u16, message: &str) -> OperatorError {
    OperatorError::Kube(kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".into(),
        message: message.into(),
        reason: "Injected".into(),
        code,
    }))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn creates(&self) -> usize {
        self.state.lock().await.creates.len()
    }

    pub async fn replaces(&self) -> usize {
        self.state.lock().await.replaces.len()
    }

    /// Names of created objects of `kind`, in creation order.
    pub async fn created(&self, kind: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .creates
            .iter()
            .filter(|(k, _, _)| k == kind)
            .map(|(_, _, name)| name.clone())
            .collect()
    }

    /// Every created object as `Kind/name`, in creation order.
    pub async fn creation_order(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .creates
            .iter()
            .map(|(kind, _, name)| format!("{kind}/{name}"))
            .collect()
    }

    pub async fn object<K: Managed>(&self, name: &str) -> Option<K> {
        let state = self.state.lock().await;
        state
            .objects
            .get(&key::<K>(NAMESPACE, name))
            .map(|v| serde_json::from_value(v.clone()).expect("stored object deserializes"))
    }

    pub async fn count<K: Managed>(&self) -> usize {
        let kind = K::kind(&()).to_string();
        let state = self.state.lock().await;
        state.objects.keys().filter(|(k, _, _)| *k == kind).count()
    }

    /// Store an object directly, bypassing the reconciler.
    pub async fn insert<K: Managed>(&self, obj: &K) {
        let mut state = self.state.lock().await;
        let ns = obj.namespace().unwrap_or_default();
        let value = serde_json::to_value(obj).expect("object serializes");
        state.objects.insert(key::<K>(&ns, &obj.name_any()), value);
    }

    /// Pretend the Deployment's pods came up.
    pub async fn set_deployment_status(&self, name: &str, replicas: i32, ready: i32) {
        let mut state = self.state.lock().await;
        let k = key::<Deployment>(NAMESPACE, name);
        let obj = state.objects.get_mut(&k).expect("deployment exists");
        obj["status"] = serde_json::to_value(DeploymentStatus {
            replicas: Some(replicas),
            ready_replicas: Some(ready),
            ..Default::default()
        })
        .expect("status serializes");
    }

    pub async fn fail_create_of(&self, kind: &str, name: &str) {
        self.state.lock().await.fail_create = Some((kind.into(), name.into()));
    }

    /// Make the next `get` of `kind/name` miss, as if another writer created
    /// the object right after the lookup.
    pub async fn hide_from_next_get(&self, kind: &str, name: &str) {
        self.state.lock().await.hidden = Some((kind.into(), name.into()));
    }

    pub async fn set_get_latency(&self, latency: Duration) {
        self.state.lock().await.get_latency = Some(latency);
    }

    /// Fleet status as persisted through merge patches.
    pub async fn fleet_status(&self) -> ServiceFleetStatus {
        let state = self.state.lock().await;
        serde_json::from_value(state.status.clone()).expect("status deserializes")
    }

    pub async fn status_patches(&self) -> Vec<Value> {
        self.state.lock().await.status_patches.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get<K: Managed>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        let latency = self.state.lock().await.get_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state.lock().await;
        let k = key::<K>(namespace, name);
        if state.hidden.as_ref() == Some(&(k.0.clone(), k.2.clone())) {
            state.hidden = None;
            return Ok(None);
        }
        match state.objects.get(&k) {
            Some(v) => Ok(Some(serde_json::from_value(v.clone())?)),
            None => Ok(None),
        }
    }

    async fn create<K: Managed>(&self, namespace: &str, obj: &K) -> Result<K> {
        let mut state = self.state.lock().await;
        let k = key::<K>(namespace, &obj.name_any());

        if let Some((kind, name)) = &state.fail_create {
            if *kind == k.0 && *name == k.2 {
                return Err(api_error(500, "injected create failure"));
            }
        }
        if state.objects.contains_key(&k) {
            return Err(OperatorError::AlreadyExists {
                kind: k.0,
                namespace: k.1,
                name: k.2,
            });
        }

        state.next_uid += 1;
        let mut value = serde_json::to_value(obj)?;
        value["metadata"]["uid"] = json!(format!("uid-{}", state.next_uid));
        value["metadata"]["resourceVersion"] = json!("1");

        state.objects.insert(k.clone(), value.clone());
        state.creates.push(k);
        Ok(serde_json::from_value(value)?)
    }

    async fn replace<K: Managed>(&self, namespace: &str, obj: &K) -> Result<K> {
        let mut state = self.state.lock().await;
        let k = key::<K>(namespace, &obj.name_any());
        let Some(current) = state.objects.get(&k).cloned() else {
            return Err(api_error(404, "not found"));
        };

        let version: u64 = current["metadata"]["resourceVersion"]
            .as_str()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if obj.resource_version().as_deref() != current["metadata"]["resourceVersion"].as_str() {
            return Err(api_error(409, "resourceVersion mismatch"));
        }

        let mut value = serde_json::to_value(obj)?;
        value["metadata"]["resourceVersion"] = json!((version + 1).to_string());
        // Status is owned by the cluster; replace leaves it as is.
        match current.get("status") {
            Some(status) => value["status"] = status.clone(),
            None => {
                if let Some(map) = value.as_object_mut() {
                    map.remove("status");
                }
            }
        }

        state.objects.insert(k.clone(), value.clone());
        state.replaces.push(k);
        Ok(serde_json::from_value(value)?)
    }

    async fn patch_fleet_status(&self, _fleet: &ServiceFleet, status: &Value) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.status.is_object() {
            state.status = json!({});
        }
        if let (Some(current), Some(patch)) = (state.status.as_object_mut(), status.as_object()) {
            for (field, value) in patch {
                if value.is_null() {
                    current.remove(field);
                } else {
                    current.insert(field.clone(), value.clone());
                }
            }
        }
        state.status_patches.push(status.clone());
        Ok(())
    }
}

pub fn fleet(spec: ServiceFleetSpec) -> ServiceFleet {
    let mut fleet = ServiceFleet::new("demo", spec);
    fleet.metadata.namespace = Some(NAMESPACE.into());
    fleet.metadata.uid = Some(FLEET_UID.into());
    fleet.metadata.generation = Some(1);
    fleet
}

/// The fleet as the controller would see it after the last pass.
pub async fn observed(fleet: &ServiceFleet, store: &MemoryStore) -> ServiceFleet {
    let mut next = fleet.clone();
    next.status = Some(store.fleet_status().await);
    next
}

pub fn reconciler(store: &MemoryStore) -> Reconciler<MemoryStore> {
    Reconciler::new(store.clone(), OperatorConfig::default())
}
