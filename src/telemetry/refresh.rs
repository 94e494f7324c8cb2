use std::time::SystemTime;

use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

/// Why a token issuance call was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueReason {
    /// Nothing cached yet; no prior token is sent.
    Initial,
    /// Forced renewal carrying the previous token.
    Renewal,
}

#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    reason: IssueReason,
}

impl RefreshTelemetry {
    pub fn new(reason: IssueReason) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            reason,
        }
    }

    pub fn emit_start(&self, at: SystemTime, with_old_token: bool) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            reason = ?self.reason,
            with_old_token,
            timestamp = ?at,
            "token.issue.start"
        );
    }

    pub fn emit_success(&self, at: SystemTime, token_len: usize) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            reason = ?self.reason,
            token_len,
            timestamp = ?at,
            "token.issue.success"
        );
    }

    pub fn emit_failure(&self, error: &Error, at: SystemTime) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            reason = ?self.reason,
            timestamp = ?at,
            error = %error,
            "token.issue.failure"
        );
    }
}
