use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque bearer credential. The raw value is never validated.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token value suitable for Authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep credentials out of debug logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(len={})", self.0.len())
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Body of the token issuance call. `old_token` is omitted for anonymous issuance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IssueTokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_token: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IssueTokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

impl IssueTokenResponse {
    /// An empty string counts as no token at all.
    pub fn into_token(self) -> Option<AccessToken> {
        self.token
            .filter(|value| !value.is_empty())
            .map(AccessToken::new)
    }
}
