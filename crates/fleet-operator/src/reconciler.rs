//! One reconciliation pass over a ServiceFleet.

use k8s_openapi::api::apps::v1::Deployment;
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use tracing::{debug, info, warn};

use crate::config::OperatorConfig;
use crate::constants::conditions;
use crate::converge::{self, Converge};
use crate::crds::{ServiceFleet, ServiceStatus};
use crate::desired::{DesiredState, Stage, StageError};
use crate::error::{OperatorError, Result};
use crate::status;
use crate::store::ObjectStore;

/// Drives a ServiceFleet towards its desired state through an [`ObjectStore`].
pub struct Reconciler<S> {
    store: S,
    config: OperatorConfig,
}

impl<S: ObjectStore> Reconciler<S> {
    pub fn new(store: S, config: OperatorConfig) -> Self {
        Self { store, config }
    }

    /// Run one pass and persist its outcome on the fleet's status.
    ///
    /// A failed pass writes `phase: Failed` and returns the error that caused
    /// it; use [`Reconciler::error_action`] to schedule the retry.
    pub async fn reconcile(&self, fleet: &ServiceFleet) -> Result<Action> {
        let name = fleet.name_any();
        let namespace = fleet.namespace().unwrap_or_else(|| "default".into());
        info!(name = %name, namespace = %namespace, "Reconciling ServiceFleet");

        if fleet.phase().is_none() {
            self.store
                .patch_fleet_status(fleet, &status::initializing())
                .await?;
        }

        let timeout = self.config.reconcile_timeout;
        let outcome = match tokio::time::timeout(timeout, self.converge(fleet)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(StageError::services(OperatorError::Timeout(timeout))),
        };

        match outcome {
            Ok(services) => {
                let ready = services.iter().filter(|s| s.ready).count();
                let total = services.len();
                let new_status =
                    status::ready(fleet.status.as_ref(), services, fleet.metadata.generation);
                self.store
                    .patch_fleet_status(fleet, &serde_json::to_value(&new_status)?)
                    .await?;
                info!(name = %name, ready, total, "ServiceFleet reconciled");
                Ok(self.config.requeue.on_success())
            }
            Err(StageError { stage, error }) => {
                let reason = failure_reason(stage, &error);
                warn!(name = %name, namespace = %namespace, reason, "Reconciliation failed: {error}");
                let patch = status::failed(fleet.status.as_ref(), reason, &error.to_string());
                self.store.patch_fleet_status(fleet, &patch).await?;
                Err(error)
            }
        }
    }

    /// Requeue after a failed pass.
    pub fn error_action(&self, _error: &OperatorError) -> Action {
        self.config.requeue.on_failure()
    }

    /// Apply every desired object and collect per-service status.
    async fn converge(&self, fleet: &ServiceFleet) -> std::result::Result<Vec<ServiceStatus>, StageError> {
        let desired = DesiredState::build(fleet)?;
        let namespace = &desired.namespace;

        if let Some(db) = desired.database {
            self.apply(fleet, db.claim).await.map_err(StageError::database)?;
            self.apply(fleet, db.deployment)
                .await
                .map_err(StageError::database)?;
            self.apply(fleet, db.service).await.map_err(StageError::database)?;
        }

        let mut services = Vec::with_capacity(desired.services.len());
        for svc in desired.services {
            let key = svc.key;
            let name = key.as_str();
            self.apply(fleet, svc.deployment)
                .await
                .map_err(StageError::services)?;
            self.apply(fleet, svc.service)
                .await
                .map_err(StageError::services)?;

            let live = self
                .store
                .get::<Deployment>(namespace, name)
                .await
                .map_err(StageError::services)?
                .unwrap_or_default();
            services.push(status::service_status(
                key,
                &live,
                namespace,
                &self.config.cluster_domain,
            ));
        }

        Ok(services)
    }

    async fn apply<K: Converge>(&self, fleet: &ServiceFleet, desired: K) -> Result<()> {
        let (live, applied) = converge::apply(&self.store, fleet, desired).await?;
        debug!(kind = %K::kind(&()), name = %live.name_any(), ?applied, "Converged");
        Ok(())
    }
}

fn failure_reason(stage: Stage, error: &OperatorError) -> &'static str {
    match (stage, error) {
        (_, OperatorError::Timeout(_)) => conditions::REASON_TIMEOUT,
        (Stage::Database, _) => conditions::REASON_DATABASE_FAILED,
        (Stage::Services, _) => conditions::REASON_SERVICE_FAILED,
    }
}
