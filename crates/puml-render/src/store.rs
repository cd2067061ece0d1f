//! On-disk artifact store.
//!
//! [`ArtifactStore`] maps fingerprints to paths under the public directory:
//!
//! ```text
//! {public_dir}/{assets_dir}/puml/
//! +-- {fingerprint}          # diagram source (local backend only)
//! +-- {fingerprint}.svg      # rendered artifact
//! ```
//!
//! Presence of the artifact path is the only cache-hit signal. Stored bytes
//! are never checked against the source again, and nothing is ever evicted.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use std::sync::{Condvar, Mutex};

use crate::config::OutputFormat;
use crate::consts::ARTIFACT_DIR;

/// Filesystem layout and locking for rendered artifacts.
#[derive(Debug)]
pub struct ArtifactStore {
    public_dir: PathBuf,
    dir: PathBuf,
    in_flight: Mutex<HashSet<String>>,
    released: Condvar,
}

impl ArtifactStore {
    /// Create a store rooted at `{public_dir}/{assets_dir}/puml`.
    ///
    /// Nothing is created on disk until [`ensure_dir`](Self::ensure_dir) is called.
    #[must_use]
    pub fn new(public_dir: impl Into<PathBuf>, assets_dir: impl AsRef<Path>) -> Self {
        let public_dir = public_dir.into();
        let dir = public_dir.join(assets_dir).join(ARTIFACT_DIR);
        Self {
            public_dir,
            dir,
            in_flight: Mutex::new(HashSet::new()),
            released: Condvar::new(),
        }
    }

    /// Directory holding sources and artifacts.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the artifact directory and its ancestors if missing.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Path of the diagram source file for a fingerprint.
    #[must_use]
    pub fn source_path(&self, fingerprint: &str) -> PathBuf {
        self.dir.join(fingerprint)
    }

    /// Path of the rendered artifact for a fingerprint.
    ///
    /// Always `source_path(fingerprint)` with `.{format}` appended, which is
    /// where the `PlantUML` toolchain writes its output.
    #[must_use]
    pub fn artifact_path(&self, fingerprint: &str, format: OutputFormat) -> PathBuf {
        self.dir.join(format!("{fingerprint}.{}", format.as_str()))
    }

    /// Whether a file exists at `path`.
    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Read an artifact.
    pub fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        fs::read(path)
    }

    /// Write bytes to `path`. The directory must already exist.
    pub fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        fs::write(path, bytes)
    }

    /// Create (or truncate) `path` for streamed writes.
    pub fn create(&self, path: &Path) -> std::io::Result<File> {
        File::create(path)
    }

    /// Atomically move a finished download into place, replacing `to`.
    pub fn promote(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        fs::rename(from, to)
    }

    /// Remove a file if present, ignoring a missing file.
    pub fn remove(&self, path: &Path) -> std::io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Site-relative URL for an artifact: the path with `public_dir` removed.
    ///
    /// `public/assets/puml/abc.svg` becomes `/assets/puml/abc.svg`.
    #[must_use]
    pub fn public_url(&self, path: &Path) -> String {
        site_url(&self.public_dir, path)
    }

    /// Block until no other render holds `fingerprint`, then claim it.
    ///
    /// The claim is released when the returned guard is dropped. Only renders
    /// going through this store instance are coordinated.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn lock(&self, fingerprint: &str) -> FingerprintGuard<'_> {
        let mut in_flight = self.in_flight.lock().unwrap();
        while in_flight.contains(fingerprint) {
            in_flight = self.released.wait(in_flight).unwrap();
        }
        in_flight.insert(fingerprint.to_owned());
        FingerprintGuard {
            store: self,
            fingerprint: fingerprint.to_owned(),
        }
    }
}

/// Strip `public_dir` from `path` and join the rest with `/`, rooted at `/`.
pub(crate) fn site_url(public_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(public_dir).unwrap_or(path);
    let mut url = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            url.push('/');
            url.push_str(&part.to_string_lossy());
        }
    }
    url
}

/// Exclusive claim on a fingerprint, released on drop.
#[derive(Debug)]
pub struct FingerprintGuard<'a> {
    store: &'a ArtifactStore,
    fingerprint: String,
}

impl Drop for FingerprintGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.store.in_flight.lock() {
            in_flight.remove(&self.fingerprint);
        }
        self.store.released.notify_all();
    }
}
