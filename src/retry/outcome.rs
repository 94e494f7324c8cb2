use std::time::Duration;

use reqwest::{Method, StatusCode};
use tracing::Level;
use tracing::event;

/// Summary of one logical call chain, logged once it reaches a terminal state.
#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub method: Method,
    pub url: String,
    pub attempts: u8,
    pub refreshes: u8,
    pub status: Option<StatusCode>,
    pub success: bool,
    pub elapsed: Duration,
}

impl RetryOutcome {
    pub fn log(&self) {
        event!(
            Level::INFO,
            method = %self.method,
            url = %self.url,
            attempts = self.attempts,
            refreshes = self.refreshes,
            status = self.status.map(|s| s.as_u16()),
            success = self.success,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "retry.outcome"
        );
    }
}
