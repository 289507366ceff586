//! Shared outbound HTTP client

use reqwest::Client;

use crate::config::TimeoutBudgets;
use crate::error::{Error, Result};

/// Build the pooled client used for calls to sibling services.
///
/// Per-request deadlines are applied by the callers from their own budget.
pub(crate) fn build_client(budgets: &TimeoutBudgets) -> Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(50)
        .connect_timeout(budgets.quick_operation)
        .user_agent(concat!("refcheck/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::HttpClient(format!("Failed to build HTTP client: {}", e)))
}
