//! Create-or-overwrite of managed objects.
//!
//! Every desired object gets a controller owner reference to its
//! ServiceFleet. Objects that exist but are not controlled by that fleet are
//! never adopted.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};
use tracing::{debug, info, warn};

use crate::crds::ServiceFleet;
use crate::error::{OperatorError, Result};
use crate::metrics;
use crate::store::{Managed, ObjectStore};

/// Per-kind rule for carrying desired state onto a live object.
pub trait Converge: Managed {
    /// Overwrite the mutable parts of `self` (the live object) with `desired`.
    fn overwrite_from(&mut self, desired: &Self);
}

impl Converge for Deployment {
    fn overwrite_from(&mut self, desired: &Self) {
        self.metadata.labels = desired.metadata.labels.clone();
        self.spec = desired.spec.clone();
    }
}

impl Converge for Service {
    fn overwrite_from(&mut self, desired: &Self) {
        self.metadata.labels = desired.metadata.labels.clone();

        let live = self.spec.take().unwrap_or_default();
        let mut spec = desired.spec.clone().unwrap_or_default();

        // Allocated by the API server and immutable once set.
        spec.cluster_ip = live.cluster_ip;
        spec.cluster_ips = live.cluster_ips;
        spec.ip_families = live.ip_families;
        spec.ip_family_policy = live.ip_family_policy;

        let exposes_node_ports = matches!(
            spec.type_.as_deref(),
            Some("NodePort") | Some("LoadBalancer")
        );
        if exposes_node_ports {
            let allocated: BTreeMap<i32, i32> = live
                .ports
                .unwrap_or_default()
                .into_iter()
                .filter_map(|p| p.node_port.map(|n| (p.port, n)))
                .collect();
            for port in spec.ports.iter_mut().flatten() {
                if port.node_port.is_none() {
                    port.node_port = allocated.get(&port.port).copied();
                }
            }
            if spec.health_check_node_port.is_none() {
                spec.health_check_node_port = live.health_check_node_port;
            }
        }

        self.spec = Some(spec);
    }
}

impl Converge for PersistentVolumeClaim {
    fn overwrite_from(&mut self, desired: &Self) {
        self.metadata.labels = desired.metadata.labels.clone();

        let Some(storage) = desired
            .spec
            .as_ref()
            .and_then(|s| s.resources.as_ref())
            .and_then(|r| r.requests.as_ref())
            .and_then(|r| r.get("storage"))
        else {
            return;
        };

        let spec = self.spec.get_or_insert_with(Default::default);
        spec.resources
            .get_or_insert_with(Default::default)
            .requests
            .get_or_insert_with(Default::default)
            .insert("storage".into(), storage.clone());
    }
}

/// Controller owner reference pointing at `fleet`.
pub fn owner_reference(fleet: &ServiceFleet) -> Result<OwnerReference> {
    fleet.controller_owner_ref(&()).ok_or_else(|| {
        OperatorError::Ownership(format!(
            "ServiceFleet {} has no name or uid",
            fleet.name_any()
        ))
    })
}

/// Whether `obj` names `fleet` as its controller.
pub fn is_controlled_by<K: Resource>(obj: &K, fleet: &ServiceFleet) -> bool {
    let Some(uid) = fleet.uid() else {
        return false;
    };
    obj.owner_references()
        .iter()
        .any(|r| r.controller == Some(true) && r.uid == uid)
}

/// Attach the fleet's controller reference to `desired`.
///
/// Owner references cannot cross namespaces, so an object destined for a
/// namespace other than the fleet's is rejected.
pub fn set_owner<K: Resource<DynamicType = ()>>(desired: &mut K, fleet: &ServiceFleet) -> Result<()> {
    let owner = owner_reference(fleet)?;
    let fleet_ns = fleet.namespace().unwrap_or_default();
    let target_ns = desired.namespace().unwrap_or_default();
    if fleet_ns != target_ns {
        return Err(OperatorError::Ownership(format!(
            "cannot own {} {target_ns}/{} from ServiceFleet in namespace {fleet_ns:?}",
            K::kind(&()),
            desired.name_any(),
        )));
    }

    let refs = desired.owner_references_mut();
    refs.retain(|r| r.controller != Some(true));
    refs.push(owner);
    Ok(())
}

/// Outcome of converging a single object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Created,
    Replaced,
    Unchanged,
}

/// Converge one object towards `desired` and return the resulting live object.
pub async fn apply<S, K>(store: &S, fleet: &ServiceFleet, mut desired: K) -> Result<(K, Applied)>
where
    S: ObjectStore,
    K: Converge,
{
    set_owner(&mut desired, fleet)?;

    let kind = K::kind(&()).to_string();
    let name = desired.name_any();
    let namespace = desired.namespace().unwrap_or_default();

    let live = match store.get::<K>(&namespace, &name).await? {
        Some(live) => live,
        None => {
            info!(kind = %kind, name = %name, namespace = %namespace, "Creating object");
            match store.create(&namespace, &desired).await {
                Ok(created) => {
                    metrics::record_object_write(&kind, "create");
                    return Ok((created, Applied::Created));
                }
                Err(OperatorError::AlreadyExists { .. }) => {
                    warn!(kind = %kind, name = %name, "Object appeared concurrently, updating instead");
                    store.get::<K>(&namespace, &name).await?.ok_or_else(|| {
                        OperatorError::AlreadyExists {
                            kind: kind.clone(),
                            namespace: namespace.clone(),
                            name: name.clone(),
                        }
                    })?
                }
                Err(e) => return Err(e),
            }
        }
    };

    if !is_controlled_by(&live, fleet) {
        return Err(OperatorError::Ownership(format!(
            "{kind} {namespace}/{name} exists and is not controlled by ServiceFleet {}",
            fleet.name_any()
        )));
    }

    let mut updated = live.clone();
    updated.overwrite_from(&desired);
    if updated == live {
        debug!(kind = %kind, name = %name, "Object up to date");
        return Ok((live, Applied::Unchanged));
    }

    info!(kind = %kind, name = %name, namespace = %namespace, "Updating object");
    let replaced = store.replace(&namespace, &updated).await?;
    metrics::record_object_write(&kind, "replace");
    Ok((replaced, Applied::Replaced))
}
