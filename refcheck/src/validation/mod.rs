//! Cross-service reference validation
//!
//! [`EntityValidator`] performs single existence checks against the
//! service that owns an entity; [`BatchCoordinator`] strings them together
//! with fail-fast or collect-all semantics.

mod batch;
mod entity;
mod types;

pub use batch::*;
pub use entity::*;
pub use types::*;
