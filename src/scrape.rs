//! Scrape job derivation.
//!
//! Turns the metrics endpoints declared by the application into the
//! Prometheus-style `scrape_config` entries published to the agent.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_METRICS_PORT: u16 = 80;
pub const DEFAULT_JOB_NAME: &str = "default";

/// A metrics endpoint declared by the application.
///
/// `path` and `port` are required; they are optional here only so that a
/// spec decoded from JSON can report which one is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsEndpointSpec {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

impl MetricsEndpointSpec {
    pub fn new(path: impl Into<String>, port: u16) -> Self {
        Self {
            path: Some(path.into()),
            port: Some(port),
            job_name: None,
        }
    }

    pub fn with_job_name(mut self, job_name: impl Into<String>) -> Self {
        self.job_name = Some(job_name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticConfig {
    pub targets: Vec<String>,
}

impl StaticConfig {
    pub fn localhost(port: u16) -> Self {
        Self {
            targets: vec![format!("localhost:{port}")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub metrics_path: String,
    pub static_configs: Vec<StaticConfig>,
    /// Absent only on the fallback job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

impl ScrapeJob {
    /// The job published when the application declares no endpoints.
    pub fn default_job() -> Self {
        Self {
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            static_configs: vec![StaticConfig::localhost(DEFAULT_METRICS_PORT)],
            job_name: None,
        }
    }
}

/// Builds scrape jobs for one application.
#[derive(Debug, Clone)]
pub struct ScrapeJobBuilder {
    charm_name: String,
}

impl ScrapeJobBuilder {
    pub fn new(charm_name: impl Into<String>) -> Self {
        Self {
            charm_name: charm_name.into(),
        }
    }

    pub fn charm_name(&self) -> &str {
        &self.charm_name
    }

    /// Build one job per endpoint, in input order.
    ///
    /// Job names are `<charm>_<index>_<job_name or "default">`; the index
    /// keeps them unique even when callers repeat or omit names. `None` and
    /// an empty slice both yield the single default job.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingField` for the first endpoint without a
    /// `path` or `port`. No jobs are returned in that case.
    pub fn build(&self, endpoints: Option<&[MetricsEndpointSpec]>) -> Result<Vec<ScrapeJob>> {
        let endpoints = endpoints.unwrap_or_default();
        if endpoints.is_empty() {
            return Ok(vec![ScrapeJob::default_job()]);
        }

        endpoints
            .iter()
            .enumerate()
            .map(|(index, endpoint)| self.job_for(index, endpoint))
            .collect()
    }

    fn job_for(&self, index: usize, endpoint: &MetricsEndpointSpec) -> Result<ScrapeJob> {
        let path = endpoint
            .path
            .as_ref()
            .ok_or(Error::MissingField { index, field: "path" })?;
        let port = endpoint
            .port
            .ok_or(Error::MissingField { index, field: "port" })?;
        let name = endpoint.job_name.as_deref().unwrap_or(DEFAULT_JOB_NAME);

        Ok(ScrapeJob {
            metrics_path: path.clone(),
            static_configs: vec![StaticConfig::localhost(port)],
            job_name: Some(format!("{}_{index}_{name}", self.charm_name)),
        })
    }
}
