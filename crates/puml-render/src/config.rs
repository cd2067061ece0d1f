//! Render configuration.
//!
//! [`RenderConfig`] is an immutable value passed into every render call. There is
//! no process-wide default; callers build one (usually via `puml-config`) and hand
//! it to [`DiagramRenderer`](crate::DiagramRenderer).

use std::path::PathBuf;
use std::time::Duration;

use crate::consts::{DEFAULT_CLASS_NAME, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT};

/// Rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Run `java -jar plantuml.jar` against a source file on disk.
    Local,
    /// Request the diagram from a `PlantUML` server.
    #[default]
    Remote,
}

impl Backend {
    /// Parse backend from its configuration name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "remote" | "server" => Some(Self::Remote),
            _ => None,
        }
    }

    /// Return backend as string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// How a rendered diagram is represented in the output markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedStrategy {
    /// Post-processed SVG markup placed directly in the page.
    InlineRaw,
    /// `<img>` with a base64 data URI.
    #[default]
    InlineBase64,
    /// `<img>` with a percent-encoded data URI.
    InlineUrlEncoded,
    /// `<img>` pointing at the cached artifact under the public directory.
    LocalFileLink,
    /// `<img>` pointing at the `PlantUML` server URL. Nothing is fetched.
    ExternalLink,
}

impl EmbedStrategy {
    /// Parse strategy from its configuration name.
    ///
    /// Accepts both kebab-case names and the camelCase names used by
    /// existing site generator configurations.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inline" | "inline-raw" => Some(Self::InlineRaw),
            "inline-base64" | "inlineBase64" => Some(Self::InlineBase64),
            "inline-url-encoded" | "inlineUrlEncode" => Some(Self::InlineUrlEncoded),
            "local-link" | "localLink" => Some(Self::LocalFileLink),
            "external-link" | "externalLink" => Some(Self::ExternalLink),
            _ => None,
        }
    }

    /// Return strategy as string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InlineRaw => "inline-raw",
            Self::InlineBase64 => "inline-base64",
            Self::InlineUrlEncoded => "inline-url-encoded",
            Self::LocalFileLink => "local-link",
            Self::ExternalLink => "external-link",
        }
    }

    /// Whether the markup carries the diagram content itself.
    #[must_use]
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            Self::InlineRaw | Self::InlineBase64 | Self::InlineUrlEncoded
        )
    }
}

/// Output format for rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    /// Parse format from configuration value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Return format as string representation (also the artifact extension).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }

    /// MIME type used in data URIs.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }
}

/// Text transforms applied to SVG embedded with [`EmbedStrategy::InlineRaw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgOptions {
    /// Remove `width`, `height` and `style` attributes from the root `<svg>` tag.
    pub strip_inline_style: bool,
    /// Remove empty `<defs/>` elements.
    pub remove_empty_defs: bool,
    /// Wrap the SVG in a `<div>` carrying the class instead of tagging the `<svg>`.
    pub wrap_in_div: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            strip_inline_style: false,
            remove_empty_defs: true,
            wrap_in_div: false,
        }
    }
}

/// Settings for the local `PlantUML` toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
    /// Java runtime executable.
    pub java: PathBuf,
    /// Graphviz `dot` binary passed to `PlantUML` as `-graphvizdot`.
    pub dot: Option<PathBuf>,
    /// Path to `plantuml.jar`.
    pub jar: Option<PathBuf>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            dot: None,
            jar: None,
        }
    }
}

/// Settings for the remote `PlantUML` server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Server base URL (e.g., `http://www.plantuml.com/plantuml`).
    pub server_url: String,
    /// HTTP timeout for a single request.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Complete configuration for a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub backend: Backend,
    pub embed: EmbedStrategy,
    pub format: OutputFormat,
    /// Charset passed to the local toolchain.
    pub charset: String,
    /// CSS class applied to generated markup.
    pub class_name: String,
    /// Whether pages should carry the diagram stylesheet (see [`crate::stylesheet`]).
    pub append_css: bool,
    pub svg: SvgOptions,
    /// Root of the generated site. Stripped from artifact paths in links.
    pub public_dir: PathBuf,
    /// Assets directory relative to `public_dir`.
    pub assets_dir: PathBuf,
    pub local: LocalConfig,
    pub remote: RemoteConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            embed: EmbedStrategy::default(),
            format: OutputFormat::default(),
            charset: "utf-8".to_owned(),
            class_name: DEFAULT_CLASS_NAME.to_owned(),
            append_css: true,
            svg: SvgOptions::default(),
            public_dir: PathBuf::from("public"),
            assets_dir: PathBuf::from("assets"),
            local: LocalConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.backend, Backend::Remote);
        assert_eq!(config.embed, EmbedStrategy::InlineBase64);
        assert_eq!(config.format, OutputFormat::Svg);
        assert_eq!(config.class_name, "plantuml");
        assert_eq!(config.remote.server_url, "http://www.plantuml.com/plantuml");
        assert!(config.svg.remove_empty_defs);
        assert!(!config.svg.strip_inline_style);
        assert!(!config.svg.wrap_in_div);
        assert!(config.local.jar.is_none());
    }

    #[test]
    fn test_embed_strategy_parse_accepts_both_spellings() {
        let names = [
            ("inline", EmbedStrategy::InlineRaw),
            ("inline-raw", EmbedStrategy::InlineRaw),
            ("inlineBase64", EmbedStrategy::InlineBase64),
            ("inline-base64", EmbedStrategy::InlineBase64),
            ("inlineUrlEncode", EmbedStrategy::InlineUrlEncoded),
            ("inline-url-encoded", EmbedStrategy::InlineUrlEncoded),
            ("localLink", EmbedStrategy::LocalFileLink),
            ("local-link", EmbedStrategy::LocalFileLink),
            ("externalLink", EmbedStrategy::ExternalLink),
            ("external-link", EmbedStrategy::ExternalLink),
        ];

        for (name, expected) in names {
            assert_eq!(EmbedStrategy::parse(name), Some(expected), "{name}");
        }
        assert_eq!(EmbedStrategy::parse("iframe"), None);
    }

    #[test]
    fn test_embed_strategy_as_str_parses_back() {
        for strategy in [
            EmbedStrategy::InlineRaw,
            EmbedStrategy::InlineBase64,
            EmbedStrategy::InlineUrlEncoded,
            EmbedStrategy::LocalFileLink,
            EmbedStrategy::ExternalLink,
        ] {
            assert_eq!(EmbedStrategy::parse(strategy.as_str()), Some(strategy));
        }
    }

    #[test]
    fn test_embed_strategy_is_inline() {
        assert!(EmbedStrategy::InlineRaw.is_inline());
        assert!(EmbedStrategy::InlineUrlEncoded.is_inline());
        assert!(!EmbedStrategy::LocalFileLink.is_inline());
        assert!(!EmbedStrategy::ExternalLink.is_inline());
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("local"), Some(Backend::Local));
        assert_eq!(Backend::parse("remote"), Some(Backend::Remote));
        assert_eq!(Backend::parse("server"), Some(Backend::Remote));
        assert_eq!(Backend::parse("kroki"), None);
    }

    #[test]
    fn test_output_format_mime_type() {
        assert_eq!(OutputFormat::Svg.mime_type(), "image/svg+xml");
        assert_eq!(OutputFormat::Png.mime_type(), "image/png");
        assert_eq!(OutputFormat::parse("jpg"), None);
    }
}
