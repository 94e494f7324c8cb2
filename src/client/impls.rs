use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::{
    ApiClient,
    client::{Payload, RequestDescriptor},
    config::Config,
    errors::Error,
    request_context::RequestDispatchContext,
    retry::{RetryOutcome, RetryPlan},
    session::AdminSession,
    store::{CredentialStore, FileStore, MemoryStore},
    token::{AccessToken, TokenCache},
    types::{ApiResponse, ErrorCode, ResponseSignal},
};

impl ApiClient {
    /// Create a new ApiClient
    /// # Arguments
    /// * `config` - Explicit configuration (`Config`), typically loaded via `Config::from_file` or `Config::from_env`.
    ///
    /// Credentials persist in `config.store_path` when set, otherwise in memory.
    pub fn new(config: Config) -> Result<Self, Error> {
        let store: Arc<dyn CredentialStore> = match config.store_path.as_ref() {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        // Validate URLs before performing any network calls
        config.validate()?;
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| Error::Config(format!("Invalid api_url '{}': {e}", config.api_url)))?;
        let http_client = Client::builder()
            .user_agent(config.user_agent())
            .build()?;
        let tokens = Arc::new(TokenCache::new(
            store,
            http_client.clone(),
            config.token_url.clone(),
            config.request_timeout(),
        ));
        let context = RequestDispatchContext::build(
            http_client,
            tokens,
            RetryPlan::from_config(&config),
            api_url,
            config.request_timeout(),
        );
        Ok(Self { context, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> &RequestDispatchContext {
        &self.context
    }

    pub fn tokens(&self) -> Arc<TokenCache> {
        self.context.tokens()
    }

    /// Admin login flow sharing this client's credential store.
    pub fn session(&self) -> AdminSession {
        AdminSession::new(
            self.context.http_client().clone(),
            self.config.admin_url.clone(),
            self.context.tokens().store(),
            self.context.timeout(),
        )
    }

    /// Positional form of [`ApiClient::request`].
    pub async fn request_with(
        &self,
        url: &str,
        payload: Payload,
        method: Method,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse, Error> {
        let mut descriptor = RequestDescriptor::new(url)
            .with_method(method)
            .with_payload(payload);
        if let Some(headers) = headers {
            descriptor.headers = headers;
        }
        self.request(&descriptor).await
    }

    /// Issues the request, refreshing the token and retrying while the server
    /// rejects it with 401 and this call's retry budget lasts.
    ///
    /// Non-2xx responses are returned as-is; only transport failures, timeouts
    /// and bodies that are not JSON become errors. A 401 body that is not JSON
    /// is returned as `null`.
    pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse, Error> {
        let plan = self.context.plan();
        let mut budget = plan.budget();
        let target = descriptor.target_url();
        let start = Instant::now();
        let mut attempts: u8 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            let sent = self
                .send_once(descriptor, &target)
                .await
                .and_then(|(status, text)| parse_body(status, &text).map(|body| (status, body)));
            let (status, body) = match sent {
                Ok(parsed) => parsed,
                Err(err) => {
                    error!(
                        method = %descriptor.method,
                        url = %target,
                        attempt = attempts,
                        error = %err,
                        "request.failed"
                    );
                    self.outcome(descriptor, &target, attempts, budget.consumed(), None, start)
                        .log();
                    return Err(err);
                }
            };

            let signal = ResponseSignal::classify(status, &body);
            if signal.is_auth_failure() {
                warn!(
                    method = %descriptor.method,
                    url = %target,
                    status = status.as_u16(),
                    code = ErrorCode::from_body(&body).as_ref().map(ErrorCode::as_str),
                    "request.unauthorized: HTTP 401, refreshing token"
                );
                // Refresh even when not retrying so the next call starts with a fresh token.
                let refreshed = self.context.tokens().get_token(true).await;
                let eligible = match &signal {
                    ResponseSignal::Expired(_) => true,
                    ResponseSignal::Unauthorized => plan.retry_on_bare_401,
                    ResponseSignal::Accepted => false,
                };
                if eligible && refreshed.is_some() && budget.try_consume() {
                    info!(
                        method = %descriptor.method,
                        url = %target,
                        retry = budget.consumed(),
                        remaining = budget.remaining(),
                        max_retries = plan.max_refresh_retries,
                        "request.retry"
                    );
                    continue;
                }
                if eligible && budget.is_exhausted() {
                    warn!(
                        url = %target,
                        max_retries = plan.max_refresh_retries,
                        "request.retry_budget_exhausted"
                    );
                }
            }

            self.outcome(descriptor, &target, attempts, budget.consumed(), Some(status), start)
                .log();
            return Ok(ApiResponse::new(status, body, attempts));
        }
    }

    /// Lenient form of [`ApiClient::request`]: any failure yields an empty JSON object.
    pub async fn request_or_empty(&self, descriptor: &RequestDescriptor) -> Value {
        self.request(descriptor)
            .await
            .map(ApiResponse::into_body)
            .unwrap_or_else(|_| Value::Object(Map::new()))
    }

    async fn send_once(
        &self,
        descriptor: &RequestDescriptor,
        target: &str,
    ) -> Result<(StatusCode, String), Error> {
        let url = self.context.resolve(target)?;
        let timeout = self.context.timeout();
        let token = self.context.tokens().get_token(false).await;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, bearer(token.as_ref())?);
        for name in descriptor.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &descriptor.headers {
            headers.append(name.clone(), value.clone());
        }

        let mut request = self
            .context
            .http_client()
            .request(descriptor.method.clone(), url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = descriptor.json_body() {
            request = request.body(serde_json::to_vec(&body)?);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::from_transport(e, timeout))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(e, timeout))?;
        Ok((status, text))
    }

    fn outcome(
        &self,
        descriptor: &RequestDescriptor,
        target: &str,
        attempts: u8,
        refreshes: u8,
        status: Option<StatusCode>,
        start: Instant,
    ) -> RetryOutcome {
        RetryOutcome {
            method: descriptor.method.clone(),
            url: target.to_string(),
            attempts,
            refreshes,
            status,
            success: status.is_some_and(|s| s.is_success()),
            elapsed: start.elapsed(),
        }
    }
}

/// A 401 is handled whatever its body holds: gateways often answer with an
/// empty or HTML page, which reads as `null` so the refresh still runs.
fn parse_body(status: StatusCode, text: &str) -> Result<Value, Error> {
    match serde_json::from_str(text) {
        Ok(body) => Ok(body),
        Err(err) if status == StatusCode::UNAUTHORIZED => {
            debug!(error = %err, "request.unauthorized.unparsed_body");
            Ok(Value::Null)
        }
        Err(err) => Err(err.into()),
    }
}

/// A missing token is still sent, as `Bearer null`; the server rejects it.
fn bearer(token: Option<&AccessToken>) -> Result<HeaderValue, Error> {
    let raw = token.map(AccessToken::as_str).unwrap_or("null");
    HeaderValue::from_str(&format!("Bearer {raw}"))
        .map_err(|e| Error::Auth(format!("token is not a valid header value: {e}")))
}
