use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::Error;
use crate::store::{CredentialStore, TOKEN_KEY, USER_KEY};
use crate::token::AccessToken;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
    #[serde(default)]
    user: Value,
}

/// Successful admin sign-in.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: Value,
    pub token: AccessToken,
}

/// Interactive admin sign-in against the admin API; shares the pipeline's store.
pub struct AdminSession {
    http_client: Client,
    admin_url: String,
    store: Arc<dyn CredentialStore>,
    timeout: Duration,
}

impl AdminSession {
    pub fn new(
        http_client: Client,
        admin_url: impl Into<String>,
        store: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            admin_url: admin_url.into(),
            store,
            timeout,
        }
    }

    /// Exchanges credentials for a token and remembers both token and user.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, Error> {
        let url = self.endpoint("login");
        let resp = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;
        let body: Value = serde_json::from_str(&text)?;

        if !status.is_success() {
            let reason = body
                .pointer("/message/description")
                .and_then(Value::as_str)
                .unwrap_or("Login failed");
            warn!(status = status.as_u16(), reason, "session.login.rejected");
            return Err(Error::Auth(reason.to_string()));
        }

        let parsed: LoginResponse = serde_json::from_value(body)?;
        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| Error::Auth("login response carried no token".into()))?;

        self.store.set(TOKEN_KEY, token.as_str())?;
        self.store.set(USER_KEY, &serde_json::to_string(&parsed.user)?)?;
        info!("session.login.ok");
        Ok(LoginOutcome {
            user: parsed.user,
            token,
        })
    }

    /// Fetches the signed-in admin from the server.
    pub async fn me(&self) -> Result<Value, Error> {
        let token = self
            .store
            .get(TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("No token found".into()))?;
        let resp = self
            .http_client
            .get(self.endpoint("me"))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(e, self.timeout))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "session.me.rejected");
            return Err(Error::Auth("Failed to fetch user data".into()));
        }
        let mut body: Value = serde_json::from_str(&text)?;
        Ok(body.get_mut("user").map(Value::take).unwrap_or(Value::Null))
    }

    pub fn logout(&self) -> Result<(), Error> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        info!("session.logout");
        Ok(())
    }

    /// The user stored at login, if it is still readable.
    pub fn current_user(&self) -> Option<Value> {
        self.store
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .filter(|user| !user.is_null())
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(TOKEN_KEY).is_some_and(|t| !t.is_empty())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.admin_url.trim_end_matches('/'))
    }
}
