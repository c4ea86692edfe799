//! The full set of objects a ServiceFleet asks for.
//!
//! Everything is built before the first write of a pass, so a bad override
//! anywhere in a ServiceFleet fails the pass without touching the cluster.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Service};
use kube::ResourceExt;

use crate::crds::{ServiceFleet, ServiceKey};
use crate::defaulting;
use crate::error::OperatorError;
use crate::resources::{deployment_builder, pvc_builder, service_builder};

/// Database objects in apply order.
#[derive(Clone, Debug)]
pub struct DatabaseObjects {
    pub claim: PersistentVolumeClaim,
    pub deployment: Deployment,
    pub service: Service,
}

#[derive(Clone, Debug)]
pub struct ServiceObjects {
    pub key: ServiceKey,
    pub deployment: Deployment,
    pub service: Service,
}

#[derive(Clone, Debug)]
pub struct DesiredState {
    pub namespace: String,
    pub database: Option<DatabaseObjects>,
    /// Enabled services in registry order.
    pub services: Vec<ServiceObjects>,
}

/// Part of the fleet a failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Database,
    Services,
}

/// A failed build or apply step.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: OperatorError,
}

impl StageError {
    pub fn database(error: OperatorError) -> Self {
        Self {
            stage: Stage::Database,
            error,
        }
    }

    pub fn services(error: OperatorError) -> Self {
        Self {
            stage: Stage::Services,
            error,
        }
    }
}

/// Namespace managed objects are placed in: the global override when set,
/// otherwise the fleet's own namespace.
pub fn target_namespace(fleet: &ServiceFleet) -> String {
    fleet
        .spec
        .global
        .namespace
        .clone()
        .filter(|ns| !ns.is_empty())
        .or_else(|| fleet.namespace())
        .unwrap_or_else(|| "default".into())
}

impl DesiredState {
    pub fn build(fleet: &ServiceFleet) -> Result<Self, StageError> {
        let instance = fleet.name_any();
        let namespace = target_namespace(fleet);
        let spec = &fleet.spec;
        let global = &spec.global;
        let db = defaulting::database(&spec.database);

        let database = if db.enabled {
            Some(DatabaseObjects {
                claim: pvc_builder::build_database_pvc(&instance, &namespace, &db)
                    .map_err(StageError::database)?,
                deployment: deployment_builder::build_database_deployment(
                    &instance, &namespace, &db, global,
                )
                .map_err(StageError::database)?,
                service: service_builder::build_database_service(&instance, &namespace),
            })
        } else {
            None
        };

        let mut services = Vec::new();
        for (key, config) in spec.service_configs() {
            if !config.enabled {
                continue;
            }
            let config = defaulting::service(key, &config);
            let deployment = deployment_builder::build_service_deployment(
                &instance, &namespace, key, &config, &db, global,
            )
            .map_err(StageError::services)?;
            let service = service_builder::build_service(&instance, &namespace, key, global)
                .map_err(StageError::services)?;
            services.push(ServiceObjects {
                key,
                deployment,
                service,
            });
        }

        Ok(Self {
            namespace,
            database,
            services,
        })
    }
}
