//! `puml render` command implementation.

use std::path::PathBuf;

use clap::Args;
use puml_config::{CliSettings, Config};
use puml_render::{DiagramRenderer, DiagramRequest, RenderError};

use super::{Source, read_sources, write_lines};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Diagram files to render (default: read stdin, also `-`).
    inputs: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover puml.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rendering backend: local or remote (overrides config).
    #[arg(long)]
    backend: Option<String>,

    /// Embedding strategy (overrides config).
    #[arg(long)]
    embed: Option<String>,

    /// Output format: svg or png (overrides config).
    #[arg(long)]
    format: Option<String>,

    /// `PlantUML` server URL (overrides config).
    #[arg(long, env = "PLANTUML_SERVER_URL")]
    server_url: Option<String>,

    /// Root of the generated site (overrides config).
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Prepend the diagram stylesheet when `output.append_css` is enabled.
    #[arg(long)]
    page: bool,

    /// Enable verbose output (show cache and render logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any diagram fails to render.
    /// Markup for diagrams that did render is still printed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            backend: self.backend,
            embed: self.embed,
            format: self.format,
            server_url: self.server_url,
            public_dir: self.public_dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let renderer = DiagramRenderer::new(config.render_config()?);

        let sources = read_sources(&self.inputs)?;
        tracing::info!(
            count = sources.len(),
            backend = renderer.config().backend.as_str(),
            embed = renderer.config().embed.as_str(),
            "rendering diagrams"
        );
        let (markup, failures) = render_sources(&renderer, &sources, self.page);
        tracing::info!(
            rendered = sources.len() - failures.len(),
            failed = failures.len(),
            "render finished"
        );
        write_lines(&markup)?;

        if failures.is_empty() {
            if sources.len() > 1 {
                output.rendered(sources.len());
            }
            return Ok(());
        }

        for (label, error) in &failures {
            output.diagram_failed(label, error);
        }
        Err(CliError::Validation(format!(
            "{} of {} diagrams failed to render",
            failures.len(),
            sources.len()
        )))
    }
}

/// Render all sources, returning markup in input order and failures by label.
fn render_sources<'a>(
    renderer: &DiagramRenderer,
    sources: &'a [Source],
    page: bool,
) -> (Vec<String>, Vec<(&'a str, RenderError)>) {
    let requests: Vec<_> = sources
        .iter()
        .enumerate()
        .map(|(index, source)| DiagramRequest::new(index, source.text.as_str()))
        .collect();

    let mut result = renderer.render_all(&requests);
    result.rendered.sort_by_key(|r| r.index);
    result.errors.sort_by_key(|e| e.index);

    let mut markup = Vec::with_capacity(result.rendered.len() + 1);
    if page && let Some(css) = renderer.stylesheet() {
        markup.push(css);
    }
    markup.extend(result.rendered.into_iter().map(|r| r.html));

    let failures = result
        .errors
        .into_iter()
        .map(|f| (sources[f.index].label.as_str(), f.error))
        .collect();

    (markup, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use puml_render::{Backend, EmbedStrategy, OutputFormat, RenderConfig, request_url};
    use tempfile::TempDir;

    fn source(label: &str, text: &str) -> Source {
        Source {
            label: label.to_owned(),
            text: text.to_owned(),
        }
    }

    fn external_link_renderer() -> DiagramRenderer {
        let mut config = RenderConfig {
            embed: EmbedStrategy::ExternalLink,
            ..RenderConfig::default()
        };
        config.remote.server_url = "http://plantuml.test".to_owned();
        DiagramRenderer::new(config)
    }

    #[test]
    fn test_render_sources_in_input_order() {
        let renderer = external_link_renderer();
        let sources = vec![
            source("a.puml", "@startuml\nA\n@enduml"),
            source("b.puml", "@startuml\nB\n@enduml"),
        ];

        let (markup, failures) = render_sources(&renderer, &sources, false);

        assert!(failures.is_empty());
        let expected: Vec<String> = sources
            .iter()
            .map(|s| {
                format!(
                    r#"<img class="plantuml" src="{}" />"#,
                    request_url("http://plantuml.test", &s.text, OutputFormat::Svg)
                )
            })
            .collect();
        assert_eq!(markup, expected);
    }

    #[test]
    fn test_render_sources_page_prepends_stylesheet() {
        let renderer = external_link_renderer();
        let sources = vec![source("a.puml", "@startuml\nA\n@enduml")];

        let (markup, _) = render_sources(&renderer, &sources, true);

        assert_eq!(markup.len(), 2);
        assert!(markup[0].starts_with("<style>"));
        assert!(markup[1].starts_with("<img"));
    }

    #[test]
    fn test_render_sources_reports_failures_by_label() {
        let tmp = TempDir::new().unwrap();
        // Local backend without jar/dot fails every diagram before any work
        let renderer = DiagramRenderer::new(RenderConfig {
            backend: Backend::Local,
            public_dir: tmp.path().join("public"),
            ..RenderConfig::default()
        });
        let sources = vec![source("a.puml", "A"), source("b.puml", "B")];

        let (markup, failures) = render_sources(&renderer, &sources, false);

        assert!(markup.is_empty());
        let labels: Vec<_> = failures.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["a.puml", "b.puml"]);
        assert!(matches!(failures[0].1, RenderError::Config(_)));
    }
}
