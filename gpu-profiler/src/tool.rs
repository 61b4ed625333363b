//! External profiler executables: discovery and invocation

use crate::error::{AnalyzerError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a successful tool invocation
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
}

/// Locate a profiler executable.
///
/// `configured` may name the executable itself or the directory holding it;
/// when absent the system search path is used.
pub fn locate(tool: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.is_dir() => {
            let candidate = path.join(tool);
            if candidate.is_file() {
                Ok(candidate)
            } else {
                Err(AnalyzerError::ToolNotFound {
                    tool: tool.to_string(),
                    searched: path.display().to_string(),
                })
            }
        }
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(AnalyzerError::ToolNotFound {
            tool: tool.to_string(),
            searched: path.display().to_string(),
        }),
        None => which::which(tool).map_err(|_| AnalyzerError::ToolNotFound {
            tool: tool.to_string(),
            searched: "PATH".to_string(),
        }),
    }
}

/// Render a command line for diagnostics
pub fn command_line(program: &Path, args: &[String]) -> String {
    let mut parts = vec![program.display().to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}

/// Run a profiler command to completion.
///
/// A non-zero exit status is an error carrying the tool's stderr. When
/// `timeout` elapses the child is killed and `Timeout` is returned.
pub async fn run(
    tool: &str,
    program: &Path,
    args: &[String],
    timeout: Option<Duration>,
) -> Result<ToolOutput> {
    let command = command_line(program, args);
    debug!("{} command: {}", tool, command);

    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
    let child = cmd.output();

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child)
            .await
            .map_err(|_| AnalyzerError::Timeout {
                tool: tool.to_string(),
                timeout: limit,
            })??,
        None => child.await?,
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("{} stderr: {}", tool, stderr.trim());

    if !output.status.success() {
        return Err(AnalyzerError::ToolFailed {
            tool: tool.to_string(),
            command,
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(ToolOutput { stdout })
}
