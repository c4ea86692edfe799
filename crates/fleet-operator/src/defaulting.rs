//! Fills unset configuration fields before objects are built.
//!
//! Defaults are applied to a copy on every pass and never written back to the
//! ServiceFleet spec.

use crate::constants::defaults;
use crate::crds::{DatabaseConfig, ServiceConfig, ServiceKey};

/// Default a service config: replicas 1, image = service name, tag "latest".
pub fn service(key: ServiceKey, config: &ServiceConfig) -> ServiceConfig {
    let mut config = config.clone();
    if config.replicas.is_none() {
        config.replicas = Some(defaults::REPLICAS);
    }
    if config.image.is_empty() {
        config.image = key.as_str().to_string();
    }
    if config.tag.is_empty() {
        config.tag = defaults::TAG.to_string();
    }
    config
}

/// Default the database config: mysql:8.0 with a 10Gi volume.
pub fn database(config: &DatabaseConfig) -> DatabaseConfig {
    let mut config = config.clone();
    fill(&mut config.type_, defaults::DATABASE_TYPE);
    fill(&mut config.image, defaults::DATABASE_IMAGE);
    fill(&mut config.tag, defaults::DATABASE_TAG);
    fill(&mut config.storage_size, defaults::DATABASE_STORAGE_SIZE);
    fill(&mut config.database_name, defaults::DATABASE_NAME);
    fill(&mut config.credentials_secret, defaults::DATABASE_CREDENTIALS_SECRET);
    if config.storage_class.as_deref() == Some("") {
        config.storage_class = None;
    }
    config
}

fn fill(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_service_config_gets_defaults() {
        let config = service(ServiceKey::PetStore, &ServiceConfig::default());
        assert_eq!(config.replicas, Some(1));
        assert_eq!(config.image, "pet-store");
        assert_eq!(config.tag, "latest");
    }

    #[test]
    fn test_service_overrides_are_kept() {
        let input = ServiceConfig {
            enabled: true,
            replicas: Some(0),
            image: "ghcr.io/acme/shop".into(),
            tag: "v1.2".into(),
            resources: None,
        };
        let config = service(ServiceKey::CoffeeShop, &input);
        assert_eq!(config, input);
    }

    #[test]
    fn test_service_defaulting_does_not_touch_input() {
        let input = ServiceConfig::default();
        let _ = service(ServiceKey::Restaurant, &input);
        assert_eq!(input.image, "");
        assert_eq!(input.replicas, None);
    }

    #[test]
    fn test_database_defaults() {
        let config = database(&DatabaseConfig {
            enabled: true,
            storage_class: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(config.type_, "mysql");
        assert_eq!(config.image, "mysql");
        assert_eq!(config.tag, "8.0");
        assert_eq!(config.storage_size, "10Gi");
        assert_eq!(config.database_name, "electronics-store");
        assert_eq!(config.credentials_secret, "mysql-credentials");
        assert_eq!(config.storage_class, None);
    }

    #[test]
    fn test_database_overrides_are_kept() {
        let config = database(&DatabaseConfig {
            enabled: true,
            type_: "mysql".into(),
            image: "mariadb".into(),
            tag: "11".into(),
            storage_size: "1Gi".into(),
            storage_class: Some("fast".into()),
            database_name: "shop".into(),
            credentials_secret: "shop-db".into(),
        });
        assert_eq!(config.image, "mariadb");
        assert_eq!(config.tag, "11");
        assert_eq!(config.storage_size, "1Gi");
        assert_eq!(config.storage_class.as_deref(), Some("fast"));
        assert_eq!(config.database_name, "shop");
        assert_eq!(config.credentials_secret, "shop-db");
    }
}
