use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, Service};
use kube::api::Api;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::watcher;
use kube::{Client, ResourceExt};
use tracing::{error, info, warn};

use crate::config::OperatorConfig;
use crate::crds::ServiceFleet;
use crate::error::OperatorError;
use crate::metrics;
use crate::reconciler::Reconciler;
use crate::store::KubeStore;

/// Shared context for the ServiceFleet reconciler.
pub struct Context {
    pub reconciler: Reconciler<KubeStore>,
}

fn api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: kube::Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

/// Start the ServiceFleet controller. Returns once a shutdown signal has
/// been received and in-flight passes have finished.
pub async fn run(client: Client, config: OperatorConfig) {
    let namespace = config.watch_namespace.clone();
    let ns = namespace.as_deref();

    let fleets: Api<ServiceFleet> = api(&client, ns);
    let deployments: Api<Deployment> = api(&client, ns);
    let services: Api<Service> = api(&client, ns);
    let claims: Api<PersistentVolumeClaim> = api(&client, ns);

    info!(
        namespace = ns.unwrap_or("<all>"),
        "Starting ServiceFleet controller"
    );

    let ctx = Arc::new(Context {
        reconciler: Reconciler::new(KubeStore::new(client.clone()), config),
    });

    Controller::new(fleets, watcher::Config::default())
        .owns(deployments, watcher::Config::default())
        .owns(services, watcher::Config::default())
        .owns(claims, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((_obj, _action)) => {}
                Err(e) => {
                    error!("Reconciliation error: {:?}", e);
                }
            }
        })
        .await;

    info!("ServiceFleet controller stopped");
}

async fn reconcile(fleet: Arc<ServiceFleet>, ctx: Arc<Context>) -> Result<Action, OperatorError> {
    let started = Instant::now();
    let result = ctx.reconciler.reconcile(&fleet).await;
    metrics::observe_reconcile_duration(started.elapsed().as_secs_f64());
    metrics::record_reconciliation(if result.is_ok() { "success" } else { "error" });
    result
}

/// Error policy: every failed pass is retried after the failure interval.
fn error_policy(fleet: Arc<ServiceFleet>, error: &OperatorError, ctx: Arc<Context>) -> Action {
    warn!(
        name = %fleet.name_any(),
        transient = error.is_transient(),
        "Reconciliation error: {error}"
    );
    ctx.reconciler.error_action(error)
}
