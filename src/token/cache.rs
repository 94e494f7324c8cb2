use std::sync::Arc;
use std::time::{Duration, SystemTime};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::Error;
use crate::store::{CredentialStore, REFRESH_TOKEN_KEY, TOKEN_KEY, USER_KEY};
use crate::telemetry::refresh::{IssueReason, RefreshTelemetry};

use super::{AccessToken, IssueTokenRequest, IssueTokenResponse};

/// Source of truth for the current access token, backed by a credential store.
///
/// None of the token operations fail: issuance problems are logged and
/// surface as `None`, which callers treat as "no token available".
pub struct TokenCache {
    store: Arc<dyn CredentialStore>,
    http_client: Client,
    token_url: String,
    timeout: Duration,
    refresh_lock: Mutex<()>,
}

impl TokenCache {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        http_client: Client,
        token_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            http_client,
            token_url: token_url.into(),
            timeout,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> Arc<dyn CredentialStore> {
        Arc::clone(&self.store)
    }

    /// Returns the stored token without touching the network.
    pub fn cached(&self) -> Option<AccessToken> {
        self.store
            .get(TOKEN_KEY)
            .filter(|value| !value.is_empty())
            .map(AccessToken::new)
    }

    /// Overwrites the stored token. Store failures are logged, not returned.
    pub fn save_token(&self, token: &AccessToken) {
        if let Err(err) = self.store.set(TOKEN_KEY, token.as_str()) {
            warn!(error = %err, "token.save.failed");
        }
    }

    /// Calls the issuance endpoint, sending the previous token when `refresh` is set.
    pub async fn request_token(&self, refresh: bool) -> Option<AccessToken> {
        let _lock = self.refresh_lock.lock().await;
        self.issue_logged(refresh).await
    }

    /// Returns the cached token, issuing a new one when absent or when `refresh` is set.
    pub async fn get_token(&self, refresh: bool) -> Option<AccessToken> {
        if !refresh && let Some(token) = self.cached() {
            return Some(token);
        }

        // Only one issuance runs at a time.
        let _lock = self.refresh_lock.lock().await;
        if !refresh && let Some(token) = self.cached() {
            return Some(token);
        }
        if refresh {
            debug!("forced token refresh requested");
        } else {
            debug!("no token cached; requesting a new one");
        }
        self.issue_logged(refresh).await
    }

    /// Forgets the token and the signed-in user.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.store.remove(key) {
                warn!(key, error = %err, "token.clear.failed");
            }
        }
    }

    async fn issue_logged(&self, refresh: bool) -> Option<AccessToken> {
        let reason = if refresh {
            IssueReason::Renewal
        } else {
            IssueReason::Initial
        };
        let telemetry = RefreshTelemetry::new(reason);
        match self.issue(refresh, &telemetry).await {
            Ok(token) => {
                telemetry.emit_success(SystemTime::now(), token.as_str().len());
                Some(token)
            }
            Err(err) => {
                telemetry.emit_failure(&err, SystemTime::now());
                None
            }
        }
    }

    async fn issue(
        &self,
        refresh: bool,
        telemetry: &RefreshTelemetry,
    ) -> Result<AccessToken, Error> {
        let old_token = if refresh {
            self.store
                .get(REFRESH_TOKEN_KEY)
                .or_else(|| self.store.get(TOKEN_KEY))
        } else {
            None
        };
        telemetry.emit_start(SystemTime::now(), old_token.is_some());

        let resp = self
            .http_client
            .post(&self.token_url)
            .timeout(self.timeout)
            .json(&IssueTokenRequest { old_token })
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;
        let parsed: IssueTokenResponse = serde_json::from_str(&body)?;
        let token = parsed.into_token().ok_or_else(|| {
            Error::Auth(format!("token endpoint answered {status} without a token"))
        })?;

        self.save_token(&token);
        Ok(token)
    }
}
