pub mod common;
pub mod fleet;
pub mod service_key;

pub use common::{Condition, ResourceRequirements};
pub use fleet::{
    DatabaseConfig, GlobalConfig, Phase, ServiceConfig, ServiceFleet, ServiceFleetSpec,
    ServiceFleetStatus, ServiceStatus,
};
pub use service_key::ServiceKey;
