//! Constants shared across rendering backends.

use std::time::Duration;

/// Subdirectory of the assets directory holding sources and rendered artifacts.
pub const ARTIFACT_DIR: &str = "puml";

/// Public `PlantUML` server.
pub const DEFAULT_SERVER_URL: &str = "http://www.plantuml.com/plantuml";

/// Default HTTP timeout for `PlantUML` server requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default CSS class applied to embedded diagrams.
pub(crate) const DEFAULT_CLASS_NAME: &str = "plantuml";
