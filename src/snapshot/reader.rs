//! Snapshot directory reader
//!
//! Lists `<timestamp>.json` files and returns their raw bytes. The directory
//! is re-read on every call; nothing is cached between requests.

use super::error::SnapshotError;
use super::trim_param;
use crate::logger;
use std::path::{Path, PathBuf};
use tokio::fs;

const SNAPSHOT_EXTENSION: &str = ".json";

/// Read-only view over a directory of timestamp-named JSON snapshots
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    base_dir: PathBuf,
}

impl SnapshotReader {
    pub const fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Fail with `StatsDirMissing` unless the base directory exists
    pub async fn ensure_base_dir(&self) -> Result<(), SnapshotError> {
        match fs::metadata(&self.base_dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(SnapshotError::StatsDirMissing),
        }
    }

    /// List snapshot identifiers, newest first
    ///
    /// Entries whose stem is not all decimal digits are skipped, as are
    /// names too large for a `u64`. Leading-zero aliases are not merged.
    /// An unreadable directory yields an empty list.
    pub async fn list(&self) -> Vec<u64> {
        let mut entries = match fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                logger::log_warning(&format!(
                    "Cannot list stats directory '{}': {e}",
                    self.base_dir.display()
                ));
                return Vec::new();
            }
        };

        let mut ids = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    logger::log_warning(&format!(
                        "Error while listing '{}': {e}",
                        self.base_dir.display()
                    ));
                    break;
                }
            };

            let file_name = entry.file_name();
            let Some(id) = file_name.to_str().and_then(parse_snapshot_name) else {
                continue;
            };

            // Follows symlinks; directories named `123.json` are not snapshots
            match fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => ids.push(id),
                _ => {}
            }
        }

        // `1.json` and `01.json` both list as 1
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids
    }

    /// Return the exact bytes stored for `timestamp`
    ///
    /// Surrounding ASCII whitespace and NUL are ignored; what remains must
    /// be non-empty and all ASCII digits.
    pub async fn read(&self, timestamp: &str) -> Result<Vec<u8>, SnapshotError> {
        let timestamp = trim_param(timestamp);
        if !is_identifier(timestamp) {
            return Err(SnapshotError::InvalidIdentifier);
        }

        let path = self.snapshot_path(timestamp);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(SnapshotError::NotFound),
        }

        fs::read(&path).await.map_err(SnapshotError::ReadFailure)
    }

    fn snapshot_path(&self, timestamp: &str) -> PathBuf {
        self.base_dir.join(format!("{timestamp}{SNAPSHOT_EXTENSION}"))
    }
}

/// Non-empty, ASCII decimal digits only
fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Extract the identifier from a `<digits>.json` file name
fn parse_snapshot_name(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(SNAPSHOT_EXTENSION)?;
    if !is_identifier(stem) {
        return None;
    }
    match stem.parse() {
        Ok(id) => Some(id),
        Err(e) => {
            logger::log_debug(&format!("Skipping snapshot '{name}': {e}"));
            None
        }
    }
}
