use std::fmt;

use reqwest::StatusCode;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Reqwest(reqwest::Error),
    Http(StatusCode, String),
    Auth(String),
    Config(String),
    Store(String),
    Timeout(std::time::Duration),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Json(err) => write!(f, "malformed json: {err}"),
            Error::Reqwest(err) => write!(f, "transport error: {err}"),
            Error::Http(status, body) => write!(f, "http {status}: {body}"),
            Error::Auth(msg) => write!(f, "authentication failed: {msg}"),
            Error::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Error::Store(msg) => write!(f, "credential store: {msg}"),
            Error::Timeout(after) => write!(f, "timed out after {after:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Reqwest(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Reqwest(err)
    }
}

impl Error {
    /// Maps a transport error onto `Timeout` when reqwest gave up waiting.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            Error::Timeout(timeout)
        } else {
            Error::Reqwest(err)
        }
    }
}
