//! Backend dispatch and batch rendering.

use rayon::prelude::*;

use crate::config::{Backend, RenderConfig};
use crate::embed::stylesheet;
use crate::error::RenderError;
use crate::local::{JavaToolchain, LocalRenderer, Toolchain};
use crate::remote::{Fetch, HttpFetcher, RemoteRenderer};
use crate::store::ArtifactStore;

/// Diagram info for batch rendering.
#[derive(Debug, Clone)]
pub struct DiagramRequest {
    /// Caller-chosen index, echoed back in results.
    pub index: usize,
    pub source: String,
}

impl DiagramRequest {
    /// Create a new diagram request.
    #[must_use]
    pub fn new(index: usize, source: impl Into<String>) -> Self {
        Self {
            index,
            source: source.into(),
        }
    }
}

/// Markup for a single diagram of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    /// Index matching the original diagram request.
    pub index: usize,
    pub html: String,
}

/// Single diagram rendering failure.
#[derive(Debug, thiserror::Error)]
#[error("diagram {index}: {error}")]
pub struct RenderFailure {
    pub index: usize,
    pub error: RenderError,
}

/// Result of rendering diagrams with partial failures.
#[derive(Debug)]
pub struct PartialRenderResult<T> {
    /// Successfully rendered diagrams.
    pub rendered: Vec<T>,
    /// Errors for diagrams that failed to render.
    pub errors: Vec<RenderFailure>,
}

/// Renders diagrams with the backend selected by [`RenderConfig::backend`].
///
/// Owns the configuration, the artifact store and both backends. Renders of
/// the same source through one renderer never run concurrently.
///
/// # Example
///
/// ```ignore
/// let mut config = RenderConfig::default();
/// config.embed = EmbedStrategy::ExternalLink;
/// let renderer = DiagramRenderer::new(config);
/// let html = renderer.render("@startuml\nA -> B\n@enduml")?;
/// ```
pub struct DiagramRenderer {
    config: RenderConfig,
    store: ArtifactStore,
    local: LocalRenderer,
    remote: RemoteRenderer,
}

impl DiagramRenderer {
    /// Create a renderer running `java` for local renders and `ureq` for remote ones.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        let store = ArtifactStore::new(&config.public_dir, &config.assets_dir);
        let fetcher = HttpFetcher::new(config.remote.timeout);
        Self {
            store,
            local: LocalRenderer::new(Box::new(JavaToolchain)),
            remote: RemoteRenderer::new(Box::new(fetcher)),
            config,
        }
    }

    /// Replace the process runner used by the local backend.
    #[must_use]
    pub fn with_toolchain(mut self, toolchain: Box<dyn Toolchain>) -> Self {
        self.local = LocalRenderer::new(toolchain);
        self
    }

    /// Replace the HTTP client used by the remote backend.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Box<dyn Fetch>) -> Self {
        self.remote = RemoteRenderer::new(fetcher);
        self
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Stylesheet for pages embedding this renderer's output.
    #[must_use]
    pub fn stylesheet(&self) -> Option<String> {
        stylesheet(&self.config)
    }

    /// Render a single diagram and return its embed markup.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged. See [`LocalRenderer::render`]
    /// and [`RemoteRenderer::render`].
    pub fn render(&self, source: &str) -> Result<String, RenderError> {
        match self.config.backend {
            Backend::Local => self.local.render(&self.config, &self.store, source),
            Backend::Remote => self.remote.render(&self.config, &self.store, source),
        }
    }

    /// Render all diagrams in parallel, returning partial results on failure.
    ///
    /// Uses the global rayon thread pool. Successful diagrams are returned
    /// even when others fail.
    #[must_use]
    pub fn render_all(&self, diagrams: &[DiagramRequest]) -> PartialRenderResult<RenderedDiagram> {
        if diagrams.is_empty() {
            return PartialRenderResult {
                rendered: Vec::new(),
                errors: Vec::new(),
            };
        }

        let results: Vec<Result<RenderedDiagram, RenderFailure>> = diagrams
            .par_iter()
            .map(|d| {
                self.render(&d.source)
                    .map(|html| RenderedDiagram {
                        index: d.index,
                        html,
                    })
                    .map_err(|error| RenderFailure {
                        index: d.index,
                        error,
                    })
            })
            .collect();

        partition_results(results)
    }
}

/// Partition results into successes and failures.
fn partition_results<T>(results: Vec<Result<T, RenderFailure>>) -> PartialRenderResult<T> {
    let mut rendered = Vec::with_capacity(results.len());
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(item) => rendered.push(item),
            Err(error) => errors.push(error),
        }
    }

    PartialRenderResult { rendered, errors }
}
