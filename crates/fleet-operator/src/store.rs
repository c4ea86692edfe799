//! Access to cluster objects.
//!
//! The reconciler talks to the API server only through [`ObjectStore`], so
//! passes can be driven against an in-memory store in tests.

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::FIELD_MANAGER;
use crate::crds::ServiceFleet;
use crate::error::{OperatorError, Result};

/// Namespaced object kinds the operator reads and writes.
pub trait Managed:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + PartialEq
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> Managed for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object by name. A missing object is `Ok(None)`.
    async fn get<K: Managed>(&self, namespace: &str, name: &str) -> Result<Option<K>>;

    /// Create an object. An existing object with the same name is reported
    /// as [`OperatorError::AlreadyExists`].
    async fn create<K: Managed>(&self, namespace: &str, obj: &K) -> Result<K>;

    /// Replace an existing object. `obj` must carry the live resourceVersion.
    async fn replace<K: Managed>(&self, namespace: &str, obj: &K) -> Result<K>;

    /// Merge `status` into the ServiceFleet's status subresource.
    async fn patch_fleet_status(&self, fleet: &ServiceFleet, status: &serde_json::Value)
        -> Result<()>;
}

/// [`ObjectStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: Managed>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn create<K: Managed>(&self, namespace: &str, obj: &K) -> Result<K> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        match api.create(&PostParams::default(), obj).await {
            Ok(created) => Ok(created),
            Err(e) if is_conflict(&e) => Err(OperatorError::AlreadyExists {
                kind: K::kind(&()).to_string(),
                namespace: namespace.to_string(),
                name: obj.name_any(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace<K: Managed>(&self, namespace: &str, obj: &K) -> Result<K> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        Ok(api
            .replace(&obj.name_any(), &PostParams::default(), obj)
            .await?)
    }

    async fn patch_fleet_status(
        &self,
        fleet: &ServiceFleet,
        status: &serde_json::Value,
    ) -> Result<()> {
        let namespace = fleet.namespace().unwrap_or_else(|| "default".into());
        let api: Api<ServiceFleet> = Api::namespaced(self.client.clone(), &namespace);
        let patch = serde_json::json!({ "status": status });
        api.patch_status(
            &fleet.name_any(),
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(&patch),
        )
        .await?;
        Ok(())
    }
}

/// Check if a kube::Error is a 409 Conflict.
fn is_conflict(e: &kube::Error) -> bool {
    matches!(
        e,
        kube::Error::Api(kube::core::ErrorResponse { code: 409, .. })
    )
}
