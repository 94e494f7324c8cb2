mod descriptor;
mod impls;

pub use descriptor::{Payload, RequestDescriptor};

use crate::{config::Config, request_context::RequestDispatchContext};

/// Authenticated request pipeline: attaches the cached token, refreshes it on
/// 401 and retries within a per-call budget.
#[derive(Clone)]
pub struct ApiClient {
    context: RequestDispatchContext,
    config: Config,
}
