use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to allocate {bytes} bytes of {region} storage: {source}")]
    ArenaAllocation {
        region: &'static str,
        bytes: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("{region} storage of {bytes} bytes is smaller than the required {required} bytes")]
    ArenaTooSmall {
        region: &'static str,
        bytes: usize,
        required: usize,
    },
    #[error("snapshot is {actual} bytes but permanent storage is {expected} bytes")]
    SnapshotSize { expected: usize, actual: usize },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{what} validation failed: {reason}")]
    Validation { what: &'static str, reason: String },
}
