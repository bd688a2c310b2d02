//! Blocking invocation of mandatory external tools.

use super::tool_detection::require;
use crate::bundler::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;

/// Runs `program` with `args` in `cwd`, failing unless it exits successfully.
///
/// Both a missing program and a non-zero exit are reported as
/// [`Error::ToolInvocationFailure`] carrying the tool's stderr.
pub async fn run_tool<I, S>(program: &Path, args: I, cwd: Option<&Path>) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let resolved = require(program)?;
    let tool = program.display().to_string();

    let mut command = tokio::process::Command::new(&resolved);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .map_err(|e| Error::ToolInvocationFailure {
            tool: tool.clone(),
            reason: format!("failed to execute: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ToolInvocationFailure {
            tool,
            reason: format!("exited with {}: {}", output.status, stderr.trim()),
        });
    }

    Ok(())
}
