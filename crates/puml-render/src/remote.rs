//! Rendering via a `PlantUML` server.
//!
//! - `ExternalLink`: markup points at the server URL, nothing is fetched
//! - inline strategies: the response body is embedded directly, nothing is stored
//! - `LocalFileLink`: the response body is streamed into the artifact store
//!
//! `LocalFileLink` downloads every time, even when the artifact already
//! exists. Callers relying on fresh server output depend on this.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use ureq::Agent;

use crate::config::{EmbedStrategy, RenderConfig};
use crate::embed::{EmbedSource, check_format, encode};
use crate::error::RenderError;
use crate::fingerprint::fingerprint;
use crate::store::ArtifactStore;
use crate::url::request_url;

/// HTTP GET client used by [`RemoteRenderer`].
///
/// Implementations must be thread-safe (`Send + Sync`) for use with parallel rendering.
pub trait Fetch: Send + Sync {
    /// Fetch `url` and return the whole response body.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError>;

    /// Fetch `url` and stream the response body into `writer`.
    ///
    /// Returns the number of bytes written.
    fn fetch_to(&self, url: &str, writer: &mut dyn Write) -> Result<u64, RenderError>;
}

/// [`Fetch`] implementation backed by a pooled `ureq` agent.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
        }
    }

    /// Send a GET request, turning error statuses into [`RenderError::Http`].
    fn get(&self, url: &str) -> Result<ureq::Body, RenderError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| RenderError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(RenderError::Http(format!("HTTP {status}: {error_body}")));
        }

        Ok(body)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        self.get(url)?
            .read_to_vec()
            .map_err(|e| RenderError::Http(e.to_string()))
    }

    fn fetch_to(&self, url: &str, writer: &mut dyn Write) -> Result<u64, RenderError> {
        let mut reader = self.get(url)?.into_reader();
        let mut buf = [0u8; 8192];
        let mut written = 0u64;
        loop {
            // Read failures come from the connection, write failures from the sink
            let n = reader
                .read(&mut buf)
                .map_err(|e| RenderError::Http(e.to_string()))?;
            if n == 0 {
                return Ok(written);
            }
            writer.write_all(&buf[..n])?;
            written += n as u64;
        }
    }
}

/// Create HTTP agent with the specified timeout.
///
/// Error statuses are returned as responses so the body can be reported.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Renders diagrams through a `PlantUML` server.
pub struct RemoteRenderer {
    fetcher: Box<dyn Fetch>,
}

impl RemoteRenderer {
    #[must_use]
    pub fn new(fetcher: Box<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    /// Render `source` and return its embed markup.
    ///
    /// Blocks on the HTTP request, except for `ExternalLink` which returns
    /// without any network access.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Config`] if `InlineRaw` is combined with PNG
    /// - [`RenderError::Http`] if the server is unreachable or answers with an error status
    /// - [`RenderError::Io`] if the artifact cannot be written
    pub fn render(
        &self,
        config: &RenderConfig,
        store: &ArtifactStore,
        source: &str,
    ) -> Result<String, RenderError> {
        check_format(config)?;
        let url = request_url(&config.remote.server_url, source, config.format);

        match config.embed {
            EmbedStrategy::ExternalLink => encode(config, EmbedSource::Url(&url)),
            EmbedStrategy::InlineRaw
            | EmbedStrategy::InlineBase64
            | EmbedStrategy::InlineUrlEncoded => {
                tracing::debug!(%url, "fetching diagram");
                let bytes = self.fetcher.fetch(&url)?;
                encode(config, EmbedSource::Bytes(&bytes))
            }
            EmbedStrategy::LocalFileLink => self.download(config, store, source, &url),
        }
    }

    /// Stream the rendered diagram into the store and link to it.
    fn download(
        &self,
        config: &RenderConfig,
        store: &ArtifactStore,
        source: &str,
        url: &str,
    ) -> Result<String, RenderError> {
        let hash = fingerprint(source);
        store.ensure_dir()?;
        let _guard = store.lock(&hash);

        let artifact_path = store.artifact_path(&hash, config.format);
        let mut partial_name = artifact_path.clone().into_os_string();
        partial_name.push(".part");
        let partial_path = PathBuf::from(partial_name);

        tracing::debug!(%url, path = %artifact_path.display(), "downloading diagram");
        let mut file = store.create(&partial_path)?;
        let written = self.fetcher.fetch_to(url, &mut file).and_then(|n| {
            file.flush()?;
            Ok(n)
        });
        drop(file);

        let bytes = match written {
            Ok(bytes) => bytes,
            Err(e) => {
                if let Err(cleanup) = store.remove(&partial_path) {
                    tracing::warn!(
                        "failed to remove partial download {}: {cleanup}",
                        partial_path.display()
                    );
                }
                return Err(e);
            }
        };

        store.promote(&partial_path, &artifact_path)?;
        tracing::info!(path = %artifact_path.display(), bytes, "downloaded diagram");
        encode(config, EmbedSource::File(&artifact_path))
    }
}
