//! Server configuration loaded from the environment

use std::net::SocketAddr;

use anyhow::{Context, Result};
use refcheck::{ModuleEndpoints, TimeoutBudgets};

/// Everything the server needs at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub endpoints: ModuleEndpoints,
    pub budgets: TimeoutBudgets,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            endpoints: ModuleEndpoints::defaults(),
            budgets: TimeoutBudgets::default(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup("REFCHECK_BIND_ADDR") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid REFCHECK_BIND_ADDR: {}", raw))?,
            None => Self::default().bind_addr,
        };

        Ok(Self {
            bind_addr,
            endpoints: ModuleEndpoints::from_lookup(&lookup),
            budgets: TimeoutBudgets::from_lookup(&lookup),
        })
    }
}
