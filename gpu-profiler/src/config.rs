//! Analyzer configuration

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Environment variable naming an explicit `ncu` executable or its directory
pub const NCU_PATH_ENV: &str = "KERNELSCOPE_NCU_PATH";

/// Environment variable naming an explicit `nsys` executable or its directory
pub const NSYS_PATH_ENV: &str = "KERNELSCOPE_NSYS_PATH";

/// Environment variable bounding external export commands, in seconds
pub const EXPORT_TIMEOUT_ENV: &str = "KERNELSCOPE_EXPORT_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Nsight Compute executable or installation directory (None = search PATH)
    pub ncu_path: Option<PathBuf>,

    /// Nsight Systems executable or installation directory (None = search PATH)
    pub nsys_path: Option<PathBuf>,

    /// Upper bound on a single external tool invocation (None = wait forever)
    pub export_timeout: Option<Duration>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ncu_path: std::env::var_os(NCU_PATH_ENV).map(PathBuf::from),
            nsys_path: std::env::var_os(NSYS_PATH_ENV).map(PathBuf::from),
            export_timeout: std::env::var(EXPORT_TIMEOUT_ENV)
                .ok()
                .and_then(|raw| parse_timeout_secs(&raw)),
        }
    }
}

/// Parse the timeout environment value; anything but whole seconds is ignored
fn parse_timeout_secs(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!(
                "Ignoring {}={:?}: expected a whole number of seconds",
                EXPORT_TIMEOUT_ENV, raw
            );
            None
        }
    }
}

impl AnalyzerConfig {
    /// Configuration that ignores the environment: search PATH, no timeout
    pub fn from_search_path() -> Self {
        Self {
            ncu_path: None,
            nsys_path: None,
            export_timeout: None,
        }
    }

    pub fn with_ncu_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ncu_path = Some(path.into());
        self
    }

    pub fn with_nsys_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.nsys_path = Some(path.into());
        self
    }

    pub fn with_export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = Some(timeout);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.export_timeout {
            if timeout.is_zero() {
                return Err(AnalyzerError::Config(
                    "Export timeout must be greater than 0".to_string(),
                ));
            }
        }

        for path in [&self.ncu_path, &self.nsys_path].into_iter().flatten() {
            if path.as_os_str().is_empty() {
                return Err(AnalyzerError::Config(
                    "Tool path must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
