//! Kubernetes operator for ServiceFleet resources.
//!
//! A ServiceFleet selects which of a fixed set of demo services run in a
//! namespace, along with an optional MySQL database. The operator keeps a
//! Deployment and Service per enabled service (plus the database workload,
//! Service and volume claim) converged with the fleet definition and reports their
//! readiness on the fleet's status.

pub mod config;
pub mod constants;
pub mod controller;
pub mod converge;
pub mod crds;
pub mod defaulting;
pub mod desired;
pub mod error;
pub mod metrics;
pub mod quantity;
pub mod reconciler;
pub mod requeue;
pub mod resources;
pub mod status;
pub mod store;
pub mod telemetry;

pub use crds::ServiceFleet;
pub use error::{OperatorError, Result};
