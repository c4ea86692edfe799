/// Kubernetes label keys following the app.kubernetes.io convention.
pub mod labels {
    pub const APP: &str = "app";
    pub const NAME: &str = "app.kubernetes.io/name";
    pub const INSTANCE: &str = "app.kubernetes.io/instance";
    pub const COMPONENT: &str = "app.kubernetes.io/component";
    pub const PART_OF: &str = "app.kubernetes.io/part-of";
    pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
}

/// Label values.
pub mod values {
    pub const PART_OF: &str = "service-fleet";
    pub const MANAGED_BY: &str = "fleet-operator";
    pub const COMPONENT_SERVICE: &str = "microservice";
    pub const COMPONENT_DATABASE: &str = "database";
}

/// Ports exposed by managed workloads.
pub mod ports {
    pub const HTTP: i32 = 8080;
    pub const MYSQL: i32 = 3306;
}

/// Probe settings shared by every service workload.
pub mod probes {
    pub const HEALTH_PATH: &str = "/health";
    pub const LIVENESS_INITIAL_DELAY_SECS: i32 = 30;
    pub const LIVENESS_PERIOD_SECS: i32 = 10;
    pub const READINESS_INITIAL_DELAY_SECS: i32 = 5;
    pub const READINESS_PERIOD_SECS: i32 = 5;
}

/// Fixed names and settings of the shared database.
pub mod database {
    pub const NAME: &str = "mysql";
    pub const CLAIM_NAME: &str = "mysql-pvc";
    pub const VOLUME_NAME: &str = "mysql-storage";
    pub const DATA_DIR: &str = "/var/lib/mysql";

    /// Keys expected inside the credentials Secret.
    pub const SECRET_ROOT_PASSWORD_KEY: &str = "root-password";
    pub const SECRET_USERNAME_KEY: &str = "username";
    pub const SECRET_PASSWORD_KEY: &str = "password";
}

/// Default values applied by the defaulter and serde.
pub mod defaults {
    pub const REPLICAS: i32 = 1;
    pub const TAG: &str = "latest";
    pub const IMAGE_PULL_POLICY: &str = "IfNotPresent";
    pub const SERVICE_TYPE: &str = "ClusterIP";
    pub const CLUSTER_DOMAIN: &str = "cluster.local";

    pub const DATABASE_TYPE: &str = "mysql";
    pub const DATABASE_IMAGE: &str = "mysql";
    pub const DATABASE_TAG: &str = "8.0";
    pub const DATABASE_STORAGE_SIZE: &str = "10Gi";
    pub const DATABASE_NAME: &str = "electronics-store";
    pub const DATABASE_CREDENTIALS_SECRET: &str = "mysql-credentials";

    /// Requeue intervals in seconds.
    pub const REQUEUE_SUCCESS_SECS: u64 = 300;
    pub const REQUEUE_FAILURE_SECS: u64 = 120;

    /// Deadline for the object work of a single pass.
    pub const RECONCILE_TIMEOUT_SECS: u64 = 60;
}

/// Condition types and reasons written to the ServiceFleet status.
pub mod conditions {
    pub const READY: &str = "Ready";
    pub const REASON_SERVICES_READY: &str = "ServicesReady";
    pub const MESSAGE_SERVICES_READY: &str = "All services are ready";
    pub const REASON_DATABASE_FAILED: &str = "DatabaseFailed";
    pub const REASON_SERVICE_FAILED: &str = "ServiceFailed";
    pub const REASON_TIMEOUT: &str = "ReconcileTimeout";
}

/// Field manager name used for status patches.
pub const FIELD_MANAGER: &str = "fleet-operator";
