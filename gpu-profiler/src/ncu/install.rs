//! Nsight Compute installation discovery

use crate::error::{AnalyzerError, Result};
use crate::tool;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scripting extension directory every complete installation ships
pub const PYTHON_EXTRAS: &str = "extras/python";

/// A located Nsight Compute installation
#[derive(Debug, Clone)]
pub struct NcuInstallation {
    executable: PathBuf,
    root: PathBuf,
}

impl NcuInstallation {
    /// Find `ncu` (configured location or PATH) and verify its installation
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        let executable = tool::locate("ncu", configured)?;
        // PATH entries are often symlinks into the real install tree
        let executable = std::fs::canonicalize(&executable).unwrap_or(executable);
        Self::from_executable(executable)
    }

    /// Verify the installation around a known executable
    pub fn from_executable(executable: PathBuf) -> Result<Self> {
        let root = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let install = Self { executable, root };
        if !install.python_extension_dir().is_dir() {
            return Err(AnalyzerError::MalformedInstallation {
                tool: "ncu",
                root: install.root,
                expected: PYTHON_EXTRAS,
            });
        }

        debug!("Using Nsight Compute installation at {}", install.root.display());
        Ok(install)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Installation directory holding the executable
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the vendor's report-reading scripting module
    pub fn python_extension_dir(&self) -> PathBuf {
        self.root.join(PYTHON_EXTRAS)
    }

    /// Arguments that print the raw per-kernel page of `report` as CSV
    pub fn import_args(&self, report: &Path, counters: &[&str]) -> Vec<String> {
        vec![
            "--import".to_string(),
            report.display().to_string(),
            "--page".to_string(),
            "raw".to_string(),
            "--csv".to_string(),
            "--print-units".to_string(),
            "base".to_string(),
            "--metrics".to_string(),
            counters.join(","),
        ]
    }
}
