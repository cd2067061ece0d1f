//! Render error types.

use std::path::PathBuf;

/// Error returned by every render operation.
///
/// Nothing is retried internally: each variant surfaces to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Configuration is incomplete or inconsistent. Raised before any work starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// The `PlantUML` toolchain exited unsuccessfully or wrote to stderr.
    #[error("plantuml failed ({}): {}", exit_description(.code), toolchain_message(.stderr, .stdout))]
    Toolchain {
        /// Exit code of the toolchain process (`None` if killed by a signal).
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
        /// Captured standard output.
        stdout: String,
    },

    /// The toolchain reported success but the artifact was not written.
    #[error("plantuml produced no output at {}", .0.display())]
    MissingArtifact(PathBuf),

    /// The `PlantUML` server could not be reached or answered with an error status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Rendered SVG is not valid UTF-8 and cannot be inlined.
    #[error("invalid SVG: {0}")]
    InvalidSvg(String),

    /// Filesystem failure while reading or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_owned(),
    }
}

fn toolchain_message<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    let stderr = stderr.trim();
    if stderr.is_empty() { stdout.trim() } else { stderr }
}
