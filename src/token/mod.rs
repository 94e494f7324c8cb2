mod cache;
mod envelope;

pub use cache::TokenCache;
pub use envelope::{AccessToken, IssueTokenRequest, IssueTokenResponse};
