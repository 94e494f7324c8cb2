//! Authenticated request pipeline for the Kashtat admin API.
//!
//! [`ApiClient`] attaches a cached bearer token to every request, refreshes it
//! when the server answers 401 and retries within a per-call budget.
//! [`token::TokenCache`] owns the token, persisted through a
//! [`store::CredentialStore`].

mod client;
pub mod config;
pub mod errors;
mod request_context;
pub mod retry;
mod session;
pub mod store;
pub mod telemetry;
pub mod token;
mod types;

pub use client::{ApiClient, Payload, RequestDescriptor};
pub use config::{Config, ConfigLocation, read_config};
pub use errors::Error;
pub use request_context::RequestDispatchContext;
pub use session::{AdminSession, LoginOutcome};
pub use types::{ApiEnvelope, ApiResponse, ErrorCode, ResponseSignal};

#[cfg(test)]
mod tests;
