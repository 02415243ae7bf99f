//! Runtime configuration loaded from `config.toml`.
//!
//! Holds the deployment to read from and an ordered RPC endpoint list that
//! the sync engine uses with automatic fallback: if the primary RPC fails,
//! the next one is tried.

use std::path::Path;

use anyhow::{Context, Result, bail};
use prize_vault::Deployment;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Ordered list of RPC URLs (best first).
    #[serde(default)]
    pub rpcs: Vec<String>,
    /// Contracts to read from.
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// RPC endpoints to try, in order. A command-line override replaces
    /// the configured list.
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is available.
    pub fn rpcs(&self, rpc_override: Option<&str>) -> Result<Vec<String>> {
        if let Some(rpc) = rpc_override {
            return Ok(vec![rpc.to_owned()]);
        }
        if self.rpcs.is_empty() {
            bail!("no RPC endpoint configured: set `rpcs` or pass --rpc");
        }
        Ok(self.rpcs.clone())
    }
}
