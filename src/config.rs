//! Provider configuration.
//!
//! The charm name is supplied explicitly here and handed to the scrape job
//! builder; nothing in the crate looks it up from the process environment
//! on its own.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_ENDPOINT_NAME: &str = "cos-agent";

/// Overrides the charm name.
pub const CHARM_NAME_ENV: &str = "COS_AGENT_CHARM_NAME";
/// Overrides the endpoint name.
pub const ENDPOINT_NAME_ENV: &str = "COS_AGENT_ENDPOINT";
/// Set by the host for every hook, e.g. `myapp/0`.
pub const UNIT_NAME_ENV: &str = "JUJU_UNIT_NAME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Local endpoint the relations are managed under.
    /// Default: "cos-agent"
    #[serde(default = "default_endpoint_name")]
    pub endpoint_name: String,

    /// Owning application name, used verbatim in job names.
    pub charm_name: String,
}

fn default_endpoint_name() -> String {
    DEFAULT_ENDPOINT_NAME.to_string()
}

impl ProviderConfig {
    pub fn new(charm_name: impl Into<String>) -> Self {
        Self {
            endpoint_name: default_endpoint_name(),
            charm_name: charm_name.into(),
        }
    }

    pub fn with_endpoint_name(mut self, endpoint_name: impl Into<String>) -> Self {
        self.endpoint_name = endpoint_name.into();
        self
    }

    /// Resolve the config from the hook environment.
    ///
    /// `COS_AGENT_CHARM_NAME` wins; otherwise the application part of
    /// `JUJU_UNIT_NAME` is used.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let charm_name = lookup(CHARM_NAME_ENV)
            .filter(|name| !name.is_empty())
            .or_else(|| {
                lookup(UNIT_NAME_ENV).and_then(|unit| {
                    unit.split('/')
                        .next()
                        .filter(|app| !app.is_empty())
                        .map(str::to_string)
                })
            })
            .ok_or_else(|| {
                Error::Config(format!(
                    "charm name not set: export {CHARM_NAME_ENV} or {UNIT_NAME_ENV}"
                ))
            })?;

        let mut config = Self::new(charm_name);
        if let Some(endpoint) = lookup(ENDPOINT_NAME_ENV).filter(|name| !name.is_empty()) {
            config.endpoint_name = endpoint;
        }
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|err| Error::Config(format!("read {}: {err}", path.display())))?;
        let config: Self = serde_json::from_slice(&data)
            .map_err(|err| Error::Config(format!("parse {}: {err}", path.display())))?;
        if config.charm_name.is_empty() {
            return Err(Error::Config(format!(
                "empty charm_name in {}",
                path.display()
            )));
        }
        Ok(config)
    }
}
