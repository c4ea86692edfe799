//! ServiceFleet manifests and the generated CRD.

use kube::CustomResourceExt;

use fleet_operator::crds::{Phase, ServiceFleet, ServiceKey};

const MANIFEST: &str = r#"
apiVersion: fleet.io/v1
kind: ServiceFleet
metadata:
  name: demo
  namespace: shop
spec:
  services:
    coffeeShop:
      enabled: true
    electronicsStore:
      enabled: true
      replicas: 2
      tag: v1.4
      resources:
        limits:
          cpu: 500m
          memory: 512Mi
  database:
    enabled: true
    storageClass: fast-ssd
  global:
    serviceType: NodePort
    ingressEnabled: true
    ingressHost: shop.example.com
"#;

#[test]
fn manifest_parses() {
    let fleet: ServiceFleet = serde_yaml::from_str(MANIFEST).unwrap();
    assert_eq!(fleet.metadata.name.as_deref(), Some("demo"));

    let spec = &fleet.spec;
    assert_eq!(spec.services.len(), 2);
    let store = &spec.services[&ServiceKey::ElectronicsStore];
    assert_eq!(store.replicas, Some(2));
    assert_eq!(store.tag, "v1.4");
    let limits = store.resources.as_ref().unwrap().limits.as_ref().unwrap();
    assert_eq!(limits["memory"], "512Mi");

    assert!(spec.database.enabled);
    assert_eq!(spec.database.storage_size, "");
    assert_eq!(spec.database.storage_class.as_deref(), Some("fast-ssd"));
    assert_eq!(spec.global.service_type, "NodePort");
    assert!(spec.global.ingress_enabled);
    assert!(fleet.status.is_none());
    assert_eq!(fleet.phase(), None);
}

#[test]
fn unknown_service_key_is_rejected() {
    let manifest = MANIFEST.replace("coffeeShop", "teaHouse");
    assert!(serde_yaml::from_str::<ServiceFleet>(&manifest).is_err());
}

#[test]
fn status_round_trips_in_camel_case() {
    let status = serde_json::json!({
        "phase": "Ready",
        "observedGeneration": 4,
        "conditions": [{
            "type": "Ready",
            "status": "True",
            "reason": "ServicesReady",
            "message": "All services are ready",
            "lastTransitionTime": "2026-01-01T00:00:00Z"
        }],
        "services": [{
            "name": "coffee-shop",
            "ready": true,
            "replicas": 1,
            "readyReplicas": 1,
            "endpoint": "coffee-shop.shop.svc.cluster.local:8080"
        }]
    });
    let mut fleet: ServiceFleet = serde_yaml::from_str(MANIFEST).unwrap();
    fleet.status = Some(serde_json::from_value(status.clone()).unwrap());

    assert_eq!(fleet.phase(), Some(Phase::Ready));
    let back = serde_json::to_value(fleet.status.as_ref().unwrap()).unwrap();
    assert_eq!(back, status);
}

#[test]
fn crd_definition() {
    let crd = ServiceFleet::crd();
    assert_eq!(crd.metadata.name.as_deref(), Some("servicefleets.fleet.io"));
    assert_eq!(crd.spec.scope, "Namespaced");
    assert_eq!(
        crd.spec.names.short_names,
        Some(vec!["sfleet".to_string()])
    );

    let version = &crd.spec.versions[0];
    assert_eq!(version.name, "v1");
    assert!(version.subresources.as_ref().unwrap().status.is_some());

    let columns: Vec<_> = version
        .additional_printer_columns
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(columns, vec!["Phase", "Ready Services", "Age"]);
}
