//! HTML markup for rendered diagrams.
//!
//! [`encode`] turns a rendered diagram into the markup for the configured
//! [`EmbedStrategy`]. Each strategy has its own handler and its own required
//! input (see [`EmbedSource`]).

use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

use crate::config::{EmbedStrategy, OutputFormat, RenderConfig};
use crate::error::RenderError;
use crate::store::site_url;
use crate::svg;

/// Characters left unescaped in data URIs: `A-Z a-z 0-9 - _ . ! ~ * ( )`.
///
/// Matches `encodeURIComponent` except that `'` is escaped, since the URI is
/// placed in a single-quoted attribute.
const DATA_URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'(')
    .remove(b')');

/// Rendered diagram handed to [`encode`].
#[derive(Debug, Clone, Copy)]
pub enum EmbedSource<'a> {
    /// Rendered bytes held in memory.
    Bytes(&'a [u8]),
    /// Artifact persisted on disk. Inline strategies read it back.
    File(&'a Path),
    /// `PlantUML` server URL for the diagram.
    Url(&'a str),
}

/// Build the markup for `source` according to `config.embed`.
///
/// | strategy | input | output |
/// |---|---|---|
/// | `InlineBase64` | bytes or file | `<img class='C' src='data:<mime>;base64,...'>` |
/// | `InlineUrlEncoded` | bytes or file | `<img class='C' src='data:<mime>;utf8,...'>` |
/// | `InlineRaw` | bytes or file (SVG) | post-processed SVG |
/// | `LocalFileLink` | file | `<img src="/path/below/public"/>` |
/// | `ExternalLink` | URL | `<img class="C" src="<url>" />` |
///
/// # Errors
///
/// - [`RenderError::Config`] if the input kind does not fit the strategy, or
///   `InlineRaw` is combined with PNG output
/// - [`RenderError::InvalidSvg`] if `InlineRaw` input is not UTF-8
/// - [`RenderError::Io`] if a file input cannot be read
pub fn encode(config: &RenderConfig, source: EmbedSource<'_>) -> Result<String, RenderError> {
    match config.embed {
        EmbedStrategy::InlineBase64 => {
            let bytes = inline_bytes(source)?;
            Ok(format!(
                "<img class='{}' src='data:{};base64,{}'>",
                config.class_name,
                config.format.mime_type(),
                BASE64_STANDARD.encode(bytes)
            ))
        }
        EmbedStrategy::InlineUrlEncoded => {
            let bytes = inline_bytes(source)?;
            Ok(format!(
                "<img class='{}' src='data:{};utf8,{}'>",
                config.class_name,
                config.format.mime_type(),
                percent_encode(&bytes, DATA_URI_ENCODE_SET)
            ))
        }
        EmbedStrategy::InlineRaw => {
            check_format(config)?;
            let bytes = inline_bytes(source)?;
            let text = String::from_utf8(bytes).map_err(|e| RenderError::InvalidSvg(e.to_string()))?;
            Ok(svg::process(config, &text))
        }
        EmbedStrategy::LocalFileLink => {
            let EmbedSource::File(path) = source else {
                return Err(mismatch(config.embed, "an artifact path"));
            };
            Ok(format!(
                r#"<img src="{}"/>"#,
                site_url(&config.public_dir, path)
            ))
        }
        EmbedStrategy::ExternalLink => {
            let EmbedSource::Url(url) = source else {
                return Err(mismatch(config.embed, "a server URL"));
            };
            Ok(format!(
                r#"<img class="{}" src="{url}" />"#,
                config.class_name
            ))
        }
    }
}

/// Reject strategy/format combinations that can never produce markup.
///
/// Renderers call this before doing any work.
pub(crate) fn check_format(config: &RenderConfig) -> Result<(), RenderError> {
    if config.embed == EmbedStrategy::InlineRaw && config.format != OutputFormat::Svg {
        return Err(RenderError::Config(
            "inline-raw embedding requires svg output".to_owned(),
        ));
    }
    Ok(())
}

/// Stylesheet for pages embedding diagrams, if `append_css` is enabled.
///
/// Centers diagrams and keeps them within the content width.
#[must_use]
pub fn stylesheet(config: &RenderConfig) -> Option<String> {
    config.append_css.then(|| {
        let class = &config.class_name;
        format!(
            "<style>img.{class},svg.{class},div.{class}{{display:block;margin:1em auto;max-width:100%;height:auto}}div.{class}>svg{{max-width:100%;height:auto}}</style>"
        )
    })
}

/// Bytes for an inline strategy, reading persisted artifacts back from disk.
fn inline_bytes(source: EmbedSource<'_>) -> Result<Vec<u8>, RenderError> {
    match source {
        EmbedSource::Bytes(bytes) => Ok(bytes.to_vec()),
        EmbedSource::File(path) => Ok(std::fs::read(path)?),
        EmbedSource::Url(_) => Err(RenderError::Config(
            "inline embedding requires rendered content, got a server URL".to_owned(),
        )),
    }
}

fn mismatch(strategy: EmbedStrategy, expected: &str) -> RenderError {
    RenderError::Config(format!("{} embedding requires {expected}", strategy.as_str()))
}
