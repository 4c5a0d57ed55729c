//! F5/F9 debug snapshots: the whole permanent arena written to and read back
//! from a single file.

use std::path::Path;

use hs_core::{CoreError, GameMemory};
use hs_platform::{read_entire_file, write_entire_file, PlatformError};
use thiserror::Error;

pub const SNAPSHOT_PATH: &str = "hs_snapshot.bin";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    File(#[from] PlatformError),
    #[error(transparent)]
    Restore(#[from] CoreError),
}

pub fn save_snapshot(path: &Path, memory: &GameMemory) -> Result<(), SnapshotError> {
    write_entire_file(path, memory.permanent_storage())?;
    log::info!(
        "Snapshot saved to '{}' ({} bytes)",
        path.display(),
        memory.permanent_storage().len()
    );
    Ok(())
}

pub fn restore_snapshot(path: &Path, memory: &mut GameMemory) -> Result<(), SnapshotError> {
    let file = read_entire_file(path)?;
    memory.restore_permanent(&file.contents)?;
    log::info!("Snapshot restored from '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hs_core::{update_game, GameInput, MemoryConfig};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hs_snapshot_test_{}_{}_{}.bin",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn memory(permanent: usize) -> GameMemory {
        GameMemory::new(&MemoryConfig {
            permanent_storage_size: permanent,
            transient_storage_size: 16,
        })
        .expect("allocate")
    }

    #[test]
    fn snapshot_restores_game_state() {
        let path = temp_file_path("restore");
        let mut live = memory(64);
        let mut input = GameInput::default();
        input.strafe_left.ended_down = true;
        for _ in 0..5 {
            update_game(&mut live, &input);
        }
        save_snapshot(&path, &live).expect("save");

        for _ in 0..5 {
            update_game(&mut live, &input);
        }
        assert_eq!(live.game_state().blue_offset, 10);

        restore_snapshot(&path, &mut live).expect("restore");
        assert_eq!(live.game_state().blue_offset, 5);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn snapshot_from_different_arena_size_is_rejected() {
        let path = temp_file_path("size");
        save_snapshot(&path, &memory(32)).expect("save");
        let mut target = memory(64);
        let err = restore_snapshot(&path, &mut target).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Restore(CoreError::SnapshotSize {
                expected: 64,
                actual: 32
            })
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_snapshot_is_a_file_error() {
        let mut target = memory(64);
        let err = restore_snapshot(&temp_file_path("missing"), &mut target).unwrap_err();
        assert!(matches!(err, SnapshotError::File(PlatformError::Read { .. })));
        assert!(!target.is_initialized());
    }
}
