use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::constants::{database, ports, values};
use crate::crds::{GlobalConfig, ServiceKey};
use crate::error::Result;

/// Build the Service exposing one service on port 8080.
///
/// The Service type comes from `global.serviceType`.
pub fn build_service(
    instance: &str,
    namespace: &str,
    key: ServiceKey,
    global: &GlobalConfig,
) -> Result<Service> {
    let name = key.as_str();
    Ok(service(
        name,
        namespace,
        instance,
        values::COMPONENT_SERVICE,
        super::service_type(global)?,
        "http",
        ports::HTTP,
    ))
}

/// Build the cluster-internal Service for the database.
pub fn build_database_service(instance: &str, namespace: &str) -> Service {
    service(
        database::NAME,
        namespace,
        instance,
        values::COMPONENT_DATABASE,
        "ClusterIP".into(),
        "mysql",
        ports::MYSQL,
    )
}

fn service(
    name: &str,
    namespace: &str,
    instance: &str,
    component: &str,
    service_type: String,
    port_name: &str,
    port: i32,
) -> Service {
    let labels = super::labels(name, instance, component);
    Service {
        metadata: ObjectMeta {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some(service_type),
            selector: Some(labels),
            ports: Some(vec![ServicePort {
                name: Some(port_name.into()),
                port,
                target_port: Some(IntOrString::Int(port)),
                protocol: Some("TCP".into()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
