//! Process-lifetime configuration
//!
//! Endpoint addresses and timeout budgets are built once at startup and
//! passed by reference into the validator and the health aggregator.

mod endpoints;
mod timeouts;

pub use endpoints::*;
pub use timeouts::*;
