// Application state module
// Immutable per-process state shared by every connection

use super::types::Config;
use crate::snapshot::SnapshotReader;

/// Application state
pub struct AppState {
    pub config: Config,
    pub reader: SnapshotReader,
}

impl AppState {
    /// Create `AppState`, binding the snapshot reader to the configured directory
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            reader: SnapshotReader::new(config.stats.dir.clone()),
        }
    }
}
