use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::apis::pure::{PureClient, DEFAULT_BASE_URL};
use crate::apis::{FetchError, PublicationSource};
use crate::enrich::{OutputTarget, DEFAULT_WORKERS};

pub const DEFAULT_PROJECT_ID: &str = "520617";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Harvester configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub project_id: String,
    pub workers: usize,
    pub timeout: Duration,
    pub output: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("PURE_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let project_id = lookup("PURE_PROJECT_ID").unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());
        let workers = parse_or("PUBLIST_WORKERS", lookup("PUBLIST_WORKERS"), DEFAULT_WORKERS);
        let timeout_secs = parse_or("PUBLIST_TIMEOUT_SECS", lookup("PUBLIST_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS);
        let output = lookup("PUBLIST_OUTPUT")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            base_url,
            project_id,
            workers,
            timeout: Duration::from_secs(timeout_secs),
            output,
        }
    }

    /// A positional output path replaces the configured one.
    pub fn with_output_arg(mut self, arg: Option<String>) -> Self {
        if let Some(path) = arg {
            self.output = Some(PathBuf::from(path));
        }
        self
    }

    pub fn output_target(&self) -> OutputTarget {
        match &self.output {
            Some(path) => OutputTarget::File(path.clone()),
            None => OutputTarget::Stdout,
        }
    }

    /// Build the Pure API client.
    pub fn build_source(&self) -> Result<Arc<dyn PublicationSource>, FetchError> {
        Ok(Arc::new(PureClient::new(self.base_url.clone(), self.timeout)?))
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}
