//! Rendering via the local `PlantUML` toolchain.
//!
//! The diagram source is written to `{fingerprint}` in the artifact directory
//! and `PlantUML` is run against it:
//!
//! ```text
//! java -jar plantuml.jar -Djava.awt.headless=true -charset utf-8 -tsvg -graphvizdot /usr/bin/dot {fingerprint}
//! ```
//!
//! `PlantUML` writes `{fingerprint}.svg` next to the source. An existing
//! artifact short-circuits the whole process.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::config::{EmbedStrategy, RenderConfig};
use crate::embed::{EmbedSource, check_format, encode};
use crate::error::RenderError;
use crate::fingerprint::fingerprint;
use crate::store::ArtifactStore;

/// Captured result of a toolchain run.
#[derive(Debug, Clone, Default)]
pub struct ToolchainOutput {
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Exit code (`None` if terminated by a signal).
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external program to completion.
///
/// Implementations must be thread-safe (`Send + Sync`) for use with parallel rendering.
pub trait Toolchain: Send + Sync {
    /// Run `program` with `args`, wait for it to exit and capture its output.
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ToolchainOutput>;
}

/// [`Toolchain`] spawning real processes with [`std::process::Command`].
#[derive(Debug, Default)]
pub struct JavaToolchain;

impl Toolchain for JavaToolchain {
    fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<ToolchainOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(ToolchainOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Renders diagrams with a local `PlantUML` jar.
pub struct LocalRenderer {
    toolchain: Box<dyn Toolchain>,
}

impl LocalRenderer {
    #[must_use]
    pub fn new(toolchain: Box<dyn Toolchain>) -> Self {
        Self { toolchain }
    }

    /// Render `source` and return its embed markup.
    ///
    /// Blocks until `PlantUML` exits. The artifact is always read back from
    /// disk, both on cache hits and right after rendering.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Config`] if `local.dot` or `local.jar` is unset, the
    ///   strategy is `ExternalLink`, or `InlineRaw` is combined with PNG.
    ///   Checked before touching the filesystem.
    /// - [`RenderError::Toolchain`] if `PlantUML` exits non-zero or writes to stderr
    /// - [`RenderError::MissingArtifact`] if `PlantUML` succeeds without output
    /// - [`RenderError::Io`] on filesystem or spawn failures
    pub fn render(
        &self,
        config: &RenderConfig,
        store: &ArtifactStore,
        source: &str,
    ) -> Result<String, RenderError> {
        let (dot, jar) = required_paths(config)?;

        let hash = fingerprint(source);
        store.ensure_dir()?;
        let _guard = store.lock(&hash);

        let source_path = store.source_path(&hash);
        let artifact_path = store.artifact_path(&hash, config.format);

        if store.exists(&artifact_path) {
            tracing::debug!(path = %artifact_path.display(), "using cached diagram");
            return encode(config, EmbedSource::File(&artifact_path));
        }

        store.write(&source_path, source.as_bytes())?;

        let args = toolchain_args(config, dot, jar, &source_path);
        tracing::debug!(
            program = %config.local.java.display(),
            input = %source_path.display(),
            "running plantuml"
        );
        let output = self.toolchain.run(&config.local.java, &args)?;

        if !output.success || !output.stderr.is_empty() {
            // Never let a partial artifact become a cache hit
            if let Err(e) = store.remove(&artifact_path) {
                tracing::warn!("failed to remove partial artifact {}: {e}", artifact_path.display());
            }
            return Err(RenderError::Toolchain {
                code: output.code,
                stderr: output.stderr,
                stdout: output.stdout,
            });
        }

        if !store.exists(&artifact_path) {
            return Err(RenderError::MissingArtifact(artifact_path));
        }

        tracing::info!(path = %artifact_path.display(), "rendered diagram");
        encode(config, EmbedSource::File(&artifact_path))
    }
}

/// Validate local settings, returning the `dot` and jar paths.
fn required_paths(config: &RenderConfig) -> Result<(&Path, &Path), RenderError> {
    let (Some(dot), Some(jar)) = (
        non_empty(config.local.dot.as_deref()),
        non_empty(config.local.jar.as_deref()),
    ) else {
        return Err(RenderError::Config(
            "local rendering requires both local.dot and local.jar".to_owned(),
        ));
    };

    if config.embed == EmbedStrategy::ExternalLink {
        return Err(RenderError::Config(
            "external-link embedding requires the remote backend".to_owned(),
        ));
    }

    check_format(config)?;

    Ok((dot, jar))
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Command-line arguments for `java` (see `plantuml -help`).
fn toolchain_args(config: &RenderConfig, dot: &Path, jar: &Path, input: &Path) -> Vec<OsString> {
    vec![
        "-jar".into(),
        jar.into(),
        // Avoids X11 lookups on headless build machines
        "-Djava.awt.headless=true".into(),
        "-charset".into(),
        config.charset.clone().into(),
        format!("-t{}", config.format.as_str()).into(),
        "-graphvizdot".into(),
        dot.into(),
        input.into(),
    ]
}
