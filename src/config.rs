//! Server configuration read from the environment

use anyhow::{Context, Result};
use std::net::SocketAddr;

pub const BIND_ADDR_VAR: &str = "ARCHLENS_BIND_ADDR";
pub const MAX_DOCUMENT_BYTES_VAR: &str = "ARCHLENS_MAX_DOCUMENT_BYTES";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
/// 10 MiB
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Largest diagram document accepted by the API
    pub max_document_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .with_context(|| format!("{BIND_ADDR_VAR} must be a socket address like 0.0.0.0:3000"))?;

        let max_document_bytes = match lookup(MAX_DOCUMENT_BYTES_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{MAX_DOCUMENT_BYTES_VAR} must be a byte count"))?,
            None => DEFAULT_MAX_DOCUMENT_BYTES,
        };

        if max_document_bytes == 0 {
            anyhow::bail!("{MAX_DOCUMENT_BYTES_VAR} must be greater than zero");
        }

        Ok(Self {
            bind_addr,
            max_document_bytes,
        })
    }
}
