//! Snapshot module
//!
//! Resolves a stats request into `list`, `read` or an error against the
//! configured snapshot directory.

mod error;
mod reader;

pub use error::SnapshotError;
pub use reader::SnapshotReader;

/// Requested operation, selected by the `action` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Read,
}

impl Action {
    /// Parse the raw `action` value; absent means `list`
    pub fn parse(raw: Option<&str>) -> Result<Self, SnapshotError> {
        match raw.map(trim_param) {
            None | Some("list") => Ok(Self::List),
            Some("read") => Ok(Self::Read),
            Some(_) => Err(SnapshotError::InvalidAction),
        }
    }
}

/// Characters stripped from both ends of a query parameter
const PARAM_TRIM: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Strip ASCII space, tab, CR, LF, NUL and vertical tab from both ends
///
/// Other Unicode whitespace is kept so that it fails validation.
pub(crate) fn trim_param(s: &str) -> &str {
    s.trim_matches(PARAM_TRIM)
}

/// Successful outcome of a stats request
#[derive(Debug)]
pub enum Snapshot {
    /// Identifiers, newest first
    Ids(Vec<u64>),
    /// Stored file bytes, untouched
    Raw(Vec<u8>),
}

/// Run one stats request
///
/// The directory check comes first, so a missing directory wins over any
/// parameter error.
pub async fn dispatch(
    reader: &SnapshotReader,
    action: Option<&str>,
    timestamp: Option<&str>,
) -> Result<Snapshot, SnapshotError> {
    reader.ensure_base_dir().await?;

    match Action::parse(action)? {
        Action::List => Ok(Snapshot::Ids(reader.list().await)),
        Action::Read => {
            let data = reader.read(timestamp.unwrap_or_default()).await?;
            Ok(Snapshot::Raw(data))
        }
    }
}
