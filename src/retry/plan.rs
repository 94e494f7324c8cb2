use crate::config::Config;

use super::RetryBudget;

/// Refresh-and-retry rules for requests rejected with 401.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPlan {
    /// Refresh-and-retry cycles allowed per call chain.
    pub max_refresh_retries: u8,
    /// Retry a 401 even when the body carries no expiry code.
    pub retry_on_bare_401: bool,
}

impl RetryPlan {
    pub fn new(max_refresh_retries: u8, retry_on_bare_401: bool) -> Self {
        Self {
            max_refresh_retries,
            retry_on_bare_401,
        }
    }

    pub fn default_plan() -> Self {
        Self {
            max_refresh_retries: 3,
            retry_on_bare_401: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_refresh_retries: config.max_refresh_retries(),
            retry_on_bare_401: config.retry_on_bare_401(),
        }
    }

    /// Fresh budget for one logical call chain.
    pub fn budget(&self) -> RetryBudget {
        RetryBudget::new(self.max_refresh_retries)
    }
}

impl Default for RetryPlan {
    fn default() -> Self {
        Self::default_plan()
    }
}
