//! Blocking invocation of external command-line tools.
//!
//! Every call waits for the tool to exit and checks its status right away.
//! A non-zero exit becomes [`ToolError::Failed`] carrying the command line and
//! the tool's stderr; callers propagate it and the run aborts.

use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Human-readable command line, for error messages.
pub fn describe(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().to_string()];
    parts.extend(command.get_args().map(|a| a.to_string_lossy().to_string()));
    parts.join(" ")
}

/// Run `command` to completion and return its stdout.
pub fn run(command: &mut Command) -> Result<Vec<u8>, ToolError> {
    let output = command.output().map_err(|source| ToolError::Spawn {
        program: command.get_program().to_string_lossy().to_string(),
        source,
    })?;
    if !output.status.success() {
        return Err(ToolError::Failed {
            command: describe(command),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

/// Run `command` and split its stdout into non-empty lines.
pub fn run_lines(command: &mut Command) -> Result<Vec<String>, ToolError> {
    let stdout = run(command)?;
    Ok(String::from_utf8_lossy(&stdout)
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Run `command` and split its stdout on NUL bytes, for `-z` output.
///
/// Paths come back verbatim, with no quoting of unusual characters.
pub fn run_nul(command: &mut Command) -> Result<Vec<String>, ToolError> {
    let stdout = run(command)?;
    Ok(stdout
        .split(|b| *b == 0)
        .filter(|field| !field.is_empty())
        .map(|field| String::from_utf8_lossy(field).to_string())
        .collect())
}
