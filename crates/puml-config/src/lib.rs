//! Configuration management for puml.
//!
//! Parses `puml.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`]. The loaded
//! [`Config`] is converted into a [`puml_render::RenderConfig`] with
//! [`Config::render_config`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `remote.server_url`
//! - `local.java`
//! - `local.dot`
//! - `local.jar`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use puml_render::{
    Backend, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT, EmbedStrategy, LocalConfig, OutputFormat,
    RemoteConfig, RenderConfig, SvgOptions,
};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override rendering backend (`local` or `remote`).
    pub backend: Option<String>,
    /// Override embedding strategy.
    pub embed: Option<String>,
    /// Override output format (`svg` or `png`).
    pub format: Option<String>,
    /// Override `PlantUML` server URL.
    pub server_url: Option<String>,
    /// Override public directory.
    pub public_dir: Option<PathBuf>,
    /// Override CSS class name.
    pub class_name: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "puml.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend, embedding and format selection.
    pub render: RenderSection,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Inline SVG post-processing.
    pub svg: SvgSection,
    /// Local toolchain configuration (paths are strings from TOML).
    local: LocalConfigRaw,
    /// `PlantUML` server configuration.
    pub remote: RemoteSection,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Resolved local toolchain configuration (set after loading).
    #[serde(skip)]
    pub local_resolved: LocalConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// `[render]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// `local` or `remote`.
    pub backend: String,
    /// Embedding strategy name (kebab-case or camelCase).
    pub embed: String,
    /// `svg` or `png`.
    pub format: String,
    /// Charset passed to the local toolchain.
    pub charset: String,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            backend: Backend::default().as_str().to_owned(),
            embed: EmbedStrategy::default().as_str().to_owned(),
            format: OutputFormat::default().as_str().to_owned(),
            charset: "utf-8".to_owned(),
        }
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    public_dir: Option<String>,
    assets_dir: Option<String>,
    class_name: Option<String>,
    append_css: Option<bool>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug)]
pub struct OutputConfig {
    /// Root of the generated site.
    pub public_dir: PathBuf,
    /// Assets directory, relative to `public_dir`.
    pub assets_dir: PathBuf,
    /// CSS class applied to generated markup.
    pub class_name: String,
    /// Whether pages carry the diagram stylesheet.
    pub append_css: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let defaults = RenderConfig::default();
        Self {
            public_dir: defaults.public_dir,
            assets_dir: defaults.assets_dir,
            class_name: defaults.class_name,
            append_css: defaults.append_css,
        }
    }
}

/// `[svg]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SvgSection {
    /// Remove `width`, `height` and `style` from the root `<svg>` tag.
    pub strip_inline_style: bool,
    /// Remove empty `<defs/>` elements.
    pub remove_empty_defs: bool,
    /// Wrap inline SVG in a `<div>` carrying the class.
    pub wrap: bool,
}

impl Default for SvgSection {
    fn default() -> Self {
        let defaults = SvgOptions::default();
        Self {
            strip_inline_style: defaults.strip_inline_style,
            remove_empty_defs: defaults.remove_empty_defs,
            wrap: defaults.wrap_in_div,
        }
    }
}

/// Raw local toolchain configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LocalConfigRaw {
    java: Option<String>,
    dot: Option<String>,
    jar: Option<String>,
}

/// `[remote]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    /// `PlantUML` server base URL.
    pub server_url: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`local.jar`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_JAR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn parse_backend(value: &str) -> Result<Backend, ConfigError> {
    Backend::parse(value).ok_or_else(|| {
        ConfigError::Validation(format!(
            "render.backend must be local or remote, got {value:?}"
        ))
    })
}

fn parse_embed(value: &str) -> Result<EmbedStrategy, ConfigError> {
    EmbedStrategy::parse(value).ok_or_else(|| {
        ConfigError::Validation(format!(
            "render.embed must be one of inline-raw, inline-base64, inline-url-encoded, \
             local-link, external-link, got {value:?}"
        ))
    })
}

fn parse_format(value: &str) -> Result<OutputFormat, ConfigError> {
    OutputFormat::parse(value).ok_or_else(|| {
        ConfigError::Validation(format!("render.format must be svg or png, got {value:?}"))
    })
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `puml.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated once all settings are applied.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(backend) = &settings.backend {
            self.render.backend.clone_from(backend);
        }
        if let Some(embed) = &settings.embed {
            self.render.embed.clone_from(embed);
        }
        if let Some(format) = &settings.format {
            self.render.format.clone_from(format);
        }
        if let Some(server_url) = &settings.server_url {
            self.remote.server_url.clone_from(server_url);
        }
        if let Some(public_dir) = &settings.public_dir {
            self.output_resolved.public_dir.clone_from(public_dir);
        }
        if let Some(class_name) = &settings.class_name {
            self.output_resolved.class_name.clone_from(class_name);
        }
    }

    /// Build the render configuration for `puml_render`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a `[render]` name is unknown.
    pub fn render_config(&self) -> Result<RenderConfig, ConfigError> {
        Ok(RenderConfig {
            backend: parse_backend(&self.render.backend)?,
            embed: parse_embed(&self.render.embed)?,
            format: parse_format(&self.render.format)?,
            charset: self.render.charset.clone(),
            class_name: self.output_resolved.class_name.clone(),
            append_css: self.output_resolved.append_css,
            svg: SvgOptions {
                strip_inline_style: self.svg.strip_inline_style,
                remove_empty_defs: self.svg.remove_empty_defs,
                wrap_in_div: self.svg.wrap,
            },
            public_dir: self.output_resolved.public_dir.clone(),
            assets_dir: self.output_resolved.assets_dir.clone(),
            local: self.local_resolved.clone(),
            remote: RemoteConfig {
                server_url: self.remote.server_url.clone(),
                timeout: Duration::from_secs(self.remote.timeout_secs),
            },
        })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let output = OutputConfig::default();
        Self {
            render: RenderSection::default(),
            output: OutputConfigRaw::default(),
            svg: SvgSection::default(),
            local: LocalConfigRaw::default(),
            remote: RemoteSection::default(),
            output_resolved: OutputConfig {
                public_dir: base.join(output.public_dir),
                ..output
            },
            local_resolved: LocalConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`] after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_output()?;
        self.validate_remote()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        parse_backend(&self.render.backend)?;
        parse_embed(&self.render.embed)?;
        parse_format(&self.render.format)?;
        require_non_empty(&self.render.charset, "render.charset")?;
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.output_resolved.class_name, "output.class_name")?;
        Ok(())
    }

    fn validate_remote(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.remote.server_url, "remote.server_url")?;
        require_http_url(&self.remote.server_url, "remote.server_url")?;

        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "remote.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.remote.server_url = expand::expand_env(&self.remote.server_url, "remote.server_url")?;

        let local = &mut self.local;
        for (value, field) in [
            (&mut local.java, "local.java"),
            (&mut local.dot, "local.dot"),
            (&mut local.jar, "local.jar"),
        ] {
            if let Some(raw) = value {
                *raw = expand::expand_env(raw, field)?;
            }
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    ///
    /// A bare `java` command name is left for `PATH` lookup.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = OutputConfig::default();

        self.output_resolved = OutputConfig {
            public_dir: config_dir.join(
                self.output
                    .public_dir
                    .as_deref()
                    .map_or(defaults.public_dir, PathBuf::from),
            ),
            assets_dir: self
                .output
                .assets_dir
                .as_deref()
                .map_or(defaults.assets_dir, PathBuf::from),
            class_name: self.output.class_name.clone().unwrap_or(defaults.class_name),
            append_css: self.output.append_css.unwrap_or(defaults.append_css),
        };

        self.local_resolved = LocalConfig {
            java: configured(self.local.java.as_deref()).map_or_else(
                || LocalConfig::default().java,
                |java| resolve_command(config_dir, java),
            ),
            dot: configured(self.local.dot.as_deref()).map(|dot| resolve_command(config_dir, dot)),
            jar: configured(self.local.jar.as_deref()).map(|jar| config_dir.join(jar)),
        };
    }
}

/// An empty tool setting counts as unset.
fn configured(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve an executable setting: a bare name is left for `PATH` lookup,
/// anything with a directory part resolves against `config_dir`.
fn resolve_command(config_dir: &Path, value: &str) -> PathBuf {
    if Path::new(value).components().count() > 1 {
        config_dir.join(value)
    } else {
        PathBuf::from(value)
    }
}
