use std::time::Duration;

use kube::runtime::controller::Action;

use crate::constants::defaults;

/// When to look at a ServiceFleet again after a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequeuePolicy {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for RequeuePolicy {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(defaults::REQUEUE_SUCCESS_SECS),
            failure: Duration::from_secs(defaults::REQUEUE_FAILURE_SECS),
        }
    }
}

impl RequeuePolicy {
    pub fn on_success(&self) -> Action {
        Action::requeue(self.success)
    }

    pub fn on_failure(&self) -> Action {
        Action::requeue(self.failure)
    }
}
