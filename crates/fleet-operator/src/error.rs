use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("invalid quantity {value:?} for {field}")]
    InvalidQuantity { field: String, value: String },

    #[error("Ownership error: {0}")]
    Ownership(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("reconciliation did not finish within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, OperatorError>;

impl OperatorError {
    /// Whether this error is transient and the reconciliation should be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OperatorError::Kube(_) | OperatorError::AlreadyExists { .. } | OperatorError::Timeout(_)
        )
    }

    pub(crate) fn invalid_quantity(field: impl Into<String>, value: impl Into<String>) -> Self {
        OperatorError::InvalidQuantity {
            field: field.into(),
            value: value.into(),
        }
    }
}
