//! `puml url` command implementation.

use std::path::PathBuf;

use clap::Args;
use puml_config::{CliSettings, Config};
use puml_render::request_url;

use super::{read_source, write_lines};
use crate::error::CliError;

/// Arguments for the url command.
#[derive(Args)]
pub(crate) struct UrlArgs {
    /// Diagram file (default: read stdin, also `-`).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover puml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `PlantUML` server URL (overrides config).
    #[arg(long, env = "PLANTUML_SERVER_URL")]
    server_url: Option<String>,

    /// Output format: svg or png (overrides config).
    #[arg(long)]
    format: Option<String>,
}

impl UrlArgs {
    /// Execute the url command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the input cannot be read.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            server_url: self.server_url,
            format: self.format,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let render_config = config.render_config()?;

        let source = read_source(self.input.as_deref())?;
        let url = request_url(
            &render_config.remote.server_url,
            &source.text,
            render_config.format,
        );
        tracing::debug!(source = %source.label, %url, "built request url");
        write_lines([url])
    }
}
