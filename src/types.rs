use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::Error;

/// Conventional `{ success, data, message, error }` body most endpoints return.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    pub success: Option<bool>,
    pub data: Option<T>,
    pub message: Option<Value>,
    pub error: Option<Value>,
}

/// Application-level code carried in a body's `error` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    SessionExpired,
    TokenExpired,
    Other(String),
}

impl ErrorCode {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "session_expired" => ErrorCode::SessionExpired,
            "token_expired" => ErrorCode::TokenExpired,
            other => ErrorCode::Other(other.to_string()),
        }
    }

    /// Reads `error` from a JSON body; non-string values carry no code.
    pub fn from_body(body: &Value) -> Option<Self> {
        body.get("error").and_then(Value::as_str).map(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::SessionExpired => "session_expired",
            ErrorCode::TokenExpired => "token_expired",
            ErrorCode::Other(code) => code,
        }
    }

    pub fn is_expiry(&self) -> bool {
        matches!(self, ErrorCode::SessionExpired | ErrorCode::TokenExpired)
    }
}

/// What a response means for the credential attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSignal {
    /// Anything that is not a 401.
    Accepted,
    /// 401 whose body names an expiry code.
    Expired(ErrorCode),
    /// 401 without an expiry code.
    Unauthorized,
}

impl ResponseSignal {
    pub fn classify(status: StatusCode, body: &Value) -> Self {
        if status != StatusCode::UNAUTHORIZED {
            return ResponseSignal::Accepted;
        }
        match ErrorCode::from_body(body) {
            Some(code) if code.is_expiry() => ResponseSignal::Expired(code),
            _ => ResponseSignal::Unauthorized,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        !matches!(self, ResponseSignal::Accepted)
    }
}

/// Terminal response of a call chain: status, parsed body and its classification.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Value,
    signal: ResponseSignal,
    attempts: u8,
}

impl ApiResponse {
    pub(crate) fn new(status: StatusCode, body: Value, attempts: u8) -> Self {
        let signal = ResponseSignal::classify(status, &body);
        Self {
            status,
            body,
            signal,
            attempts,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    pub fn signal(&self) -> &ResponseSignal {
        &self.signal
    }

    /// HTTP attempts made for this call chain, retries included.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_body(&self.body)
    }

    /// 2xx status and no explicit `success: false` in the body.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
            && self.body.get("success").and_then(Value::as_bool) != Some(false)
    }

    pub fn envelope<T: DeserializeOwned>(&self) -> Result<ApiEnvelope<T>, Error> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Converts a non-2xx response into `Error::Http` for callers that want `?`.
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::Http(self.status, self.body.to_string()))
        }
    }
}
