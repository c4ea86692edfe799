use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, EnvVarSource, HTTPGetAction,
    PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec, Probe, ResourceRequirements,
    SecretKeySelector, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::constants::{database, defaults, ports, probes, values};
use crate::crds::{DatabaseConfig, GlobalConfig, ServiceConfig, ServiceKey};
use crate::error::{OperatorError, Result};
use crate::quantity;

/// Build the Deployment for one service.
///
/// `config` and `db` must already be defaulted. Fails on malformed resource
/// quantities or invalid global overrides.
pub fn build_service_deployment(
    instance: &str,
    namespace: &str,
    key: ServiceKey,
    config: &ServiceConfig,
    db: &DatabaseConfig,
    global: &GlobalConfig,
) -> Result<Deployment> {
    let name = key.as_str();
    let labels = super::labels(name, instance, values::COMPONENT_SERVICE);

    let resources = match &config.resources {
        Some(r) => Some(ResourceRequirements {
            limits: r
                .limits
                .as_ref()
                .map(|l| quantity::parse_map(&format!("{name} resources.limits"), l))
                .transpose()?,
            requests: r
                .requests
                .as_ref()
                .map(|l| quantity::parse_map(&format!("{name} resources.requests"), l))
                .transpose()?,
            ..Default::default()
        }),
        None => None,
    };

    let env = if key.uses_database() {
        Some(database_client_env(db))
    } else {
        None
    };

    let container = Container {
        name: name.into(),
        image: Some(format!("{}:{}", config.image, config.tag)),
        image_pull_policy: Some(super::image_pull_policy(global)?),
        ports: Some(vec![ContainerPort {
            name: Some("http".into()),
            container_port: ports::HTTP,
            protocol: Some("TCP".into()),
            ..Default::default()
        }]),
        env,
        resources,
        liveness_probe: Some(health_probe(
            probes::LIVENESS_INITIAL_DELAY_SECS,
            probes::LIVENESS_PERIOD_SECS,
        )),
        readiness_probe: Some(health_probe(
            probes::READINESS_INITIAL_DELAY_SECS,
            probes::READINESS_PERIOD_SECS,
        )),
        ..Default::default()
    };

    let replicas = config.replicas.unwrap_or(defaults::REPLICAS);
    Ok(deployment(name, namespace, replicas, labels, container, None))
}

/// Build the single-replica database Deployment with its data volume.
pub fn build_database_deployment(
    instance: &str,
    namespace: &str,
    db: &DatabaseConfig,
    global: &GlobalConfig,
) -> Result<Deployment> {
    super::resolve_choice(
        "spec.database.type",
        &db.type_,
        defaults::DATABASE_TYPE,
        &[defaults::DATABASE_TYPE],
    )?;

    let labels = super::labels(database::NAME, instance, values::COMPONENT_DATABASE);
    let secret = &db.credentials_secret;

    let container = Container {
        name: database::NAME.into(),
        image: Some(format!("{}:{}", db.image, db.tag)),
        image_pull_policy: Some(super::image_pull_policy(global)?),
        env: Some(vec![
            secret_env("MYSQL_ROOT_PASSWORD", secret, database::SECRET_ROOT_PASSWORD_KEY, false),
            literal_env("MYSQL_DATABASE", &db.database_name),
            secret_env("MYSQL_USER", secret, database::SECRET_USERNAME_KEY, false),
            secret_env("MYSQL_PASSWORD", secret, database::SECRET_PASSWORD_KEY, false),
        ]),
        ports: Some(vec![ContainerPort {
            name: Some("mysql".into()),
            container_port: ports::MYSQL,
            protocol: Some("TCP".into()),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: database::VOLUME_NAME.into(),
            mount_path: database::DATA_DIR.into(),
            ..Default::default()
        }]),
        ..Default::default()
    };

    let volume = Volume {
        name: database::VOLUME_NAME.into(),
        persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
            claim_name: database::CLAIM_NAME.into(),
            ..Default::default()
        }),
        ..Default::default()
    };

    Ok(deployment(
        database::NAME,
        namespace,
        1,
        labels,
        container,
        Some(vec![volume]),
    ))
}

fn deployment(
    name: &str,
    namespace: &str,
    replicas: i32,
    labels: BTreeMap<String, String>,
    container: Container,
    volumes: Option<Vec<Volume>>,
) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn health_probe(initial_delay: i32, period: i32) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(probes::HEALTH_PATH.into()),
            port: IntOrString::Int(ports::HTTP),
            ..Default::default()
        }),
        initial_delay_seconds: Some(initial_delay),
        period_seconds: Some(period),
        ..Default::default()
    }
}

/// Connection settings pointing dependent services at the shared database.
fn database_client_env(db: &DatabaseConfig) -> Vec<EnvVar> {
    let secret = &db.credentials_secret;
    vec![
        literal_env("DB_HOST", database::NAME),
        literal_env("DB_PORT", &ports::MYSQL.to_string()),
        literal_env("DB_NAME", &db.database_name),
        secret_env("DB_USER", secret, database::SECRET_USERNAME_KEY, true),
        secret_env("DB_PASSWORD", secret, database::SECRET_PASSWORD_KEY, true),
    ]
}

fn literal_env(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.into(),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn secret_env(name: &str, secret: &str, key: &str, optional: bool) -> EnvVar {
    EnvVar {
        name: name.into(),
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret.into(),
                key: key.into(),
                optional: optional.then_some(true),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}
