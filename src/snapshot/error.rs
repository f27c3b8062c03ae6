//! Snapshot error taxonomy
//!
//! Every variant is terminal for the request and maps to one wire code,
//! one human-readable message and one HTTP status.

use hyper::StatusCode;
use std::fmt;

#[derive(Debug)]
pub enum SnapshotError {
    /// Base directory does not exist at request time
    StatsDirMissing,
    /// `action` present but not `list` or `read`
    InvalidAction,
    /// `timestamp` missing or not all decimal digits
    InvalidIdentifier,
    /// Well-formed identifier without a matching file
    NotFound,
    /// File exists but its content could not be read
    ReadFailure(std::io::Error),
}

impl SnapshotError {
    /// Wire code placed in the `error` field
    pub const fn code(&self) -> &'static str {
        match self {
            Self::StatsDirMissing => "stats_dir_not_found",
            Self::InvalidAction => "invalid_action",
            Self::InvalidIdentifier => "invalid_timestamp",
            Self::NotFound => "not_found",
            Self::ReadFailure(_) => "read_failed",
        }
    }

    /// Human-readable text placed in the `message` field
    pub const fn message(&self) -> &'static str {
        match self {
            Self::StatsDirMissing => "数据目录不存在",
            Self::InvalidAction => "action 参数无效",
            Self::InvalidIdentifier => "timestamp 参数无效",
            Self::NotFound => "未找到对应的统计文件",
            Self::ReadFailure(_) => "读取统计文件失败",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidAction | Self::InvalidIdentifier => StatusCode::BAD_REQUEST,
            Self::StatsDirMissing | Self::NotFound => StatusCode::NOT_FOUND,
            Self::ReadFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailure(e) => write!(f, "{}: {e}", self.message()),
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailure(e) => Some(e),
            _ => None,
        }
    }
}
