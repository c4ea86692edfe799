use std::time::Duration;

use clap::Parser;

use crate::constants::defaults;
use crate::error::{OperatorError, Result};
use crate::requeue::RequeuePolicy;

/// Command-line flags, each with an environment fallback.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fleet-operator",
    about = "Kubernetes operator reconciling ServiceFleet resources",
    version
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Address of the metrics and health endpoint
    #[arg(long, env = "FLEET_METRICS_ADDR", default_value = "0.0.0.0:8080")]
    pub metrics_addr: String,

    /// Only watch ServiceFleets in this namespace (all namespaces when unset)
    #[arg(long, env = "FLEET_WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// DNS suffix used in service endpoints
    #[arg(long, env = "FLEET_CLUSTER_DOMAIN", default_value = defaults::CLUSTER_DOMAIN)]
    pub cluster_domain: String,

    /// Deadline for the object work of one reconciliation
    #[arg(long, env = "FLEET_RECONCILE_TIMEOUT_SECS", default_value_t = defaults::RECONCILE_TIMEOUT_SECS)]
    pub reconcile_timeout_secs: u64,

    /// Requeue interval after a successful reconciliation
    #[arg(long, env = "FLEET_REQUEUE_SUCCESS_SECS", default_value_t = defaults::REQUEUE_SUCCESS_SECS)]
    pub requeue_success_secs: u64,

    /// Requeue interval after a failed reconciliation
    #[arg(long, env = "FLEET_REQUEUE_FAILURE_SECS", default_value_t = defaults::REQUEUE_FAILURE_SECS)]
    pub requeue_failure_secs: u64,
}

/// Settings consumed by the controller and reconciler.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorConfig {
    pub metrics_addr: String,
    pub watch_namespace: Option<String>,
    pub cluster_domain: String,
    pub reconcile_timeout: Duration,
    pub requeue: RequeuePolicy,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            metrics_addr: "0.0.0.0:8080".into(),
            watch_namespace: None,
            cluster_domain: defaults::CLUSTER_DOMAIN.into(),
            reconcile_timeout: Duration::from_secs(defaults::RECONCILE_TIMEOUT_SECS),
            requeue: RequeuePolicy::default(),
        }
    }
}

impl TryFrom<&Cli> for OperatorConfig {
    type Error = OperatorError;

    fn try_from(cli: &Cli) -> Result<Self> {
        for (flag, value) in [
            ("--reconcile-timeout-secs", cli.reconcile_timeout_secs),
            ("--requeue-success-secs", cli.requeue_success_secs),
            ("--requeue-failure-secs", cli.requeue_failure_secs),
        ] {
            if value == 0 {
                return Err(OperatorError::Config(format!("{flag} must be positive")));
            }
        }

        let cluster_domain = cli.cluster_domain.trim_matches('.').to_string();
        if cluster_domain.is_empty() {
            return Err(OperatorError::Config(
                "--cluster-domain must not be empty".into(),
            ));
        }

        Ok(Self {
            metrics_addr: cli.metrics_addr.clone(),
            watch_namespace: cli.watch_namespace.clone().filter(|ns| !ns.is_empty()),
            cluster_domain,
            reconcile_timeout: Duration::from_secs(cli.reconcile_timeout_secs),
            requeue: RequeuePolicy {
                success: Duration::from_secs(cli.requeue_success_secs),
                failure: Duration::from_secs(cli.requeue_failure_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fleet-operator").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        let config = OperatorConfig::try_from(&cli).unwrap();
        assert_eq!(config.cluster_domain, "cluster.local");
        assert_eq!(config.reconcile_timeout, Duration::from_secs(60));
        assert_eq!(config.requeue, RequeuePolicy::default());
    }

    #[test]
    fn test_flags() {
        let cli = parse(&[
            "--watch-namespace",
            "shop",
            "--cluster-domain",
            "corp.example.",
            "--requeue-failure-secs",
            "30",
        ]);
        let config = OperatorConfig::try_from(&cli).unwrap();
        assert_eq!(config.watch_namespace.as_deref(), Some("shop"));
        assert_eq!(config.cluster_domain, "corp.example");
        assert_eq!(config.requeue.failure, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cli = parse(&["--requeue-success-secs", "0"]);
        let err = OperatorConfig::try_from(&cli).unwrap_err();
        assert!(err.to_string().contains("--requeue-success-secs"));
    }

    #[test]
    fn test_empty_watch_namespace_means_all() {
        let cli = parse(&["--watch-namespace", ""]);
        let config = OperatorConfig::try_from(&cli).unwrap();
        assert!(config.watch_namespace.is_none());
    }
}
