//! Text-level SVG post-processing for inline embedding.
//!
//! `PlantUML` (via Graphviz) emits SVG whose root tag may span several lines and
//! carries fixed sizing. Before SVG markup is placed directly into a page it is
//! cleaned up with a few regex transforms. Input is never parsed as XML:
//! malformed SVG passes through best-effort.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::RenderConfig;

/// Any opening `<svg ...>` tag.
static SVG_OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<svg[^>]*>").unwrap());

/// First `<svg ...>` tag, split into attributes and optional self-closing slash.
static SVG_ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<svg([^>]*?)(\s*/?)>").unwrap());

static ROOT_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<svg[^>]*?)\s+width="[^"]*?""#).unwrap());

static ROOT_HEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<svg[^>]*?)\s+height="[^"]*?""#).unwrap());

static ROOT_STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(<svg[^>]*?)\s+style="[^"]*?""#).unwrap());

/// Self-closing empty `<defs/>` in any whitespace variant.
static EMPTY_DEFS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<defs\s*/>").unwrap());

/// `class="..."` attribute inside a tag.
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\s)class="([^"]*)""#).unwrap());

/// Prepare rendered SVG for direct inclusion in HTML.
///
/// Steps, in order:
/// 1. Line breaks inside opening `<svg>` tags become spaces.
/// 2. `svg.strip_inline_style`: drop `width`, `height` and `style` from the root tag.
/// 3. `svg.remove_empty_defs`: drop every `<defs/>`.
/// 4. `svg.wrap_in_div`: wrap in `<div class="{class_name}">`; otherwise add
///    `class_name` to the root tag's class list.
///
/// Applying `process` to its own output returns it unchanged.
#[must_use]
pub fn process(config: &RenderConfig, svg: &str) -> String {
    let mut svg = flatten_svg_tags(svg);

    if config.svg.strip_inline_style {
        svg = strip_root_sizing(&svg);
    }

    if config.svg.remove_empty_defs {
        svg = EMPTY_DEFS_RE.replace_all(&svg, "").into_owned();
    }

    if config.svg.wrap_in_div {
        wrap_in_div(&svg, &config.class_name)
    } else {
        add_root_class(&svg, &config.class_name)
    }
}

/// Replace CR and LF inside opening `<svg>` tags with spaces.
fn flatten_svg_tags(svg: &str) -> String {
    SVG_OPEN_TAG_RE
        .replace_all(svg, |caps: &Captures| caps[0].replace(['\r', '\n'], " "))
        .into_owned()
}

fn strip_root_sizing(svg: &str) -> String {
    let svg = ROOT_WIDTH_RE.replace(svg, "$1");
    let svg = ROOT_HEIGHT_RE.replace(&svg, "$1");
    ROOT_STYLE_RE.replace(&svg, "$1").into_owned()
}

fn wrap_in_div(svg: &str, class_name: &str) -> String {
    let open = format!(r#"<div class="{class_name}">"#);
    if svg.starts_with(&open) && svg.ends_with("</div>") {
        return svg.to_owned();
    }
    format!("{open}{svg}</div>")
}

fn add_root_class(svg: &str, class_name: &str) -> String {
    SVG_ROOT_RE
        .replace(svg, |caps: &Captures| {
            let attrs = &caps[1];
            let close = &caps[2];

            let Some(existing) = CLASS_ATTR_RE.captures(attrs) else {
                return format!(r#"<svg{attrs} class="{class_name}"{close}>"#);
            };

            if existing[2].split_whitespace().any(|c| c == class_name) {
                return caps[0].to_owned();
            }

            let merged = CLASS_ATTR_RE.replace(attrs, |c: &Captures| {
                let current = c[2].trim();
                if current.is_empty() {
                    format!(r#"{}class="{class_name}""#, &c[1])
                } else {
                    format!(r#"{}class="{current} {class_name}""#, &c[1])
                }
            });
            format!("<svg{merged}{close}>")
        })
        .into_owned()
}
