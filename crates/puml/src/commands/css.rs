//! `puml css` command implementation.

use std::path::PathBuf;

use clap::Args;
use puml_config::{CliSettings, Config};
use puml_render::{RenderConfig, stylesheet};

use super::write_lines;
use crate::error::CliError;

/// Arguments for the css command.
#[derive(Args)]
pub(crate) struct CssArgs {
    /// Path to configuration file (default: auto-discover puml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSS class name (overrides config).
    #[arg(long)]
    class_name: Option<String>,
}

impl CssArgs {
    /// Execute the css command.
    ///
    /// Prints the stylesheet even when `output.append_css` is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            class_name: self.class_name,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let css = forced_stylesheet(config.render_config()?)?;
        write_lines([css])
    }
}

fn forced_stylesheet(config: RenderConfig) -> Result<String, CliError> {
    stylesheet(&RenderConfig {
        append_css: true,
        ..config
    })
    .ok_or_else(|| CliError::Validation("stylesheet unavailable".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_stylesheet_ignores_append_css() {
        let config = RenderConfig {
            append_css: false,
            class_name: "uml".to_owned(),
            ..RenderConfig::default()
        };

        let css = forced_stylesheet(config).unwrap();

        assert!(css.contains("img.uml"));
    }
}
