//! `PlantUML` rendering and HTML embedding.
//!
//! This crate turns `PlantUML` source into HTML fragments ready to be placed in
//! a generated page:
//! - Content-addressed artifact cache keyed by the SHA-256 of the source
//! - Local rendering through `java -jar plantuml.jar`
//! - Remote rendering through a `PlantUML` server
//! - Five embedding strategies (inline SVG, base64 / percent-encoded data URIs,
//!   links to cached files, links to the rendering server)
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`config`]: Render configuration (`RenderConfig`, `Backend`, `EmbedStrategy`, `OutputFormat`)
//! - [`fingerprint`]: Content hash used as cache key and artifact filename
//! - [`store`]: On-disk artifact layout and per-fingerprint locking
//! - [`svg`]: Text-level SVG post-processing for inline embedding
//! - [`embed`]: HTML markup for each embedding strategy
//! - [`url`]: `PlantUML` server request URL encoding
//! - [`local`]: Rendering via the local `PlantUML` toolchain
//! - [`remote`]: Rendering via a `PlantUML` server
//! - [`renderer`]: `DiagramRenderer`, dispatching to a backend
//!
//! # Example
//!
//! ```ignore
//! use puml_render::{DiagramRenderer, RenderConfig};
//!
//! let renderer = DiagramRenderer::new(RenderConfig::default());
//! let html = renderer.render("@startuml\nA -> B\n@enduml")?;
//! ```

mod config;
mod consts;
mod embed;
mod error;
mod fingerprint;
mod local;
mod remote;
mod renderer;
mod store;
mod svg;
#[cfg(test)]
mod testing;
mod url;

pub use config::{
    Backend, EmbedStrategy, LocalConfig, OutputFormat, RemoteConfig, RenderConfig, SvgOptions,
};
pub use consts::{ARTIFACT_DIR, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT};
pub use embed::{EmbedSource, encode, stylesheet};
pub use error::RenderError;
pub use fingerprint::fingerprint;
pub use local::{JavaToolchain, LocalRenderer, Toolchain, ToolchainOutput};
pub use remote::{Fetch, HttpFetcher, RemoteRenderer};
pub use renderer::{
    DiagramRenderer, DiagramRequest, PartialRenderResult, RenderFailure, RenderedDiagram,
};
pub use store::{ArtifactStore, FingerprintGuard};
pub use svg::process as process_svg;
pub use url::request_url;
