use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::errors::Error;
use crate::retry::RetryPlan;
use crate::token::TokenCache;

/// Shared context for outbound requests ensuring consistent retry/token handling.
#[derive(Clone)]
pub struct RequestDispatchContext {
    http_client: Client,
    tokens: Arc<TokenCache>,
    plan: RetryPlan,
    api_url: Url,
    timeout: Duration,
}

impl RequestDispatchContext {
    pub fn build(
        http_client: Client,
        tokens: Arc<TokenCache>,
        plan: RetryPlan,
        api_url: Url,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            tokens,
            plan,
            api_url,
            timeout,
        }
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn tokens(&self) -> Arc<TokenCache> {
        Arc::clone(&self.tokens)
    }

    pub fn plan(&self) -> &RetryPlan {
        &self.plan
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URLs pass through; anything else is appended to the API base.
    pub fn resolve(&self, target: &str) -> Result<Url, Error> {
        if let Ok(url) = Url::parse(target) {
            return Ok(url);
        }
        let base = self.api_url.as_str().trim_end_matches('/');
        let joined = if target.starts_with('/') {
            format!("{base}{target}")
        } else {
            format!("{base}/{target}")
        };
        Url::parse(&joined)
            .map_err(|e| Error::Config(format!("Invalid request URL '{target}': {e}")))
    }
}
