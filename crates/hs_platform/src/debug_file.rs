//! Whole-file read/write for debug tooling (arena snapshots and the like).
//! Not meant for shipping assets: no streaming, no partial reads.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::PlatformError;

/// Contents of a file read in one go. The data is released on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugReadFileResult {
    pub contents: Vec<u8>,
}

impl DebugReadFileResult {
    pub fn file_size(&self) -> u32 {
        self.contents.len() as u32
    }
}

pub fn read_entire_file(path: &Path) -> Result<DebugReadFileResult, PlatformError> {
    let read_err = |source| PlatformError::Read {
        path: path.to_path_buf(),
        source,
    };
    let size = fs::metadata(path).map_err(read_err)?.len();
    if size > u64::from(u32::MAX) {
        return Err(PlatformError::FileTooLarge {
            path: path.to_path_buf(),
            size,
        });
    }
    let contents = fs::read(path).map_err(read_err)?;
    log::debug!("Read {} bytes from '{}'", contents.len(), path.display());
    Ok(DebugReadFileResult { contents })
}

/// Create or truncate `path` and write all of `data`. A short write is an
/// error.
pub fn write_entire_file(path: &Path, data: &[u8]) -> Result<(), PlatformError> {
    let write_err = |source| PlatformError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(write_err)?;
    file.write_all(data).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    log::debug!("Wrote {} bytes to '{}'", data.len(), path.display());
    Ok(())
}
