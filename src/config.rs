//! read configuration from a file or the environment

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::Error;

const DEFAULT_MAX_REFRESH_RETRIES: u8 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "kashtat-admin-client/0.1.0";

pub enum ConfigLocation {
    File(String),
    Env,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    /// Base for relative request URLs, e.g. `https://api.kashtat.co/v2`.
    pub api_url: String,
    /// Token issuance endpoint.
    pub token_url: String,
    /// Admin login/me endpoints live under this base.
    pub admin_url: String,
    /// JSON file backing the credential store; in-memory when absent.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub max_refresh_retries: Option<u8>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub retry_on_bare_401: Option<bool>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn from_values(
        api_url: impl Into<String>,
        token_url: impl Into<String>,
        admin_url: impl Into<String>,
        store_path: Option<PathBuf>,
        max_refresh_retries: Option<u8>,
        request_timeout_secs: Option<u64>,
        retry_on_bare_401: Option<bool>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            token_url: token_url.into(),
            admin_url: admin_url.into(),
            store_path,
            max_refresh_retries,
            request_timeout_secs,
            retry_on_bare_401,
            user_agent: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            api_url: required_env("KASHTAT_API_URL")?,
            token_url: required_env("KASHTAT_TOKEN_URL")?,
            admin_url: required_env("KASHTAT_ADMIN_URL")?,
            store_path: std::env::var("KASHTAT_STORE_PATH").ok().map(PathBuf::from),
            max_refresh_retries: parse_env("KASHTAT_MAX_REFRESH_RETRIES")?,
            request_timeout_secs: parse_env("KASHTAT_REQUEST_TIMEOUT_SECS")?,
            retry_on_bare_401: parse_env("KASHTAT_RETRY_ON_BARE_401")?,
            user_agent: std::env::var("KASHTAT_USER_AGENT").ok(),
        })
    }

    pub fn max_refresh_retries(&self) -> u8 {
        self.max_refresh_retries
            .unwrap_or(DEFAULT_MAX_REFRESH_RETRIES)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn retry_on_bare_401(&self) -> bool {
        self.retry_on_bare_401.unwrap_or(true)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Rejects URLs reqwest could never dispatch to.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("api_url", &self.api_url),
            ("token_url", &self.token_url),
            ("admin_url", &self.admin_url),
        ] {
            reqwest::Url::parse(value)
                .map_err(|e| Error::Config(format!("Invalid {name} '{value}': {e}")))?;
        }
        if self.request_timeout_secs == Some(0) {
            return Err(Error::Config("request_timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

pub fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    match loc {
        ConfigLocation::File(path) => Config::from_file(path),
        ConfigLocation::Env => Config::from_env(),
    }
}

fn required_env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::Config(format!("Missing {name} env var")))
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, Error> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value '{raw}' for {name}"))),
        Err(_) => Ok(None),
    }
}
