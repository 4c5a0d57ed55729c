//! The game memory arena.
//!
//! All simulation state lives in two fixed-size, zero-initialized byte
//! regions allocated once at startup. The permanent region starts with the
//! serialized `GameState`; the transient region is scratch space the game may
//! rebuild at any time. Nothing here is reallocated after `GameMemory::new`.

use serde::Deserialize;

use crate::error::CoreError;

/// Serialized size of `GameState` at the start of permanent storage.
pub const GAME_STATE_SIZE: usize = 12;

/// Tone written by the one-time initialization.
pub const DEFAULT_TONE_HZ: i32 = 256;

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub permanent_storage_size: usize,
    pub transient_storage_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            permanent_storage_size: 64 * MIB,
            transient_storage_size: 16 * MIB,
        }
    }
}

/// Simulation state, stored little-endian in the first `GAME_STATE_SIZE`
/// bytes of permanent storage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub blue_offset: i32,
    pub green_offset: i32,
    pub tone_hz: i32,
}

impl GameState {
    pub fn read_from(bytes: &[u8]) -> Self {
        Self {
            blue_offset: read_i32(bytes, 0),
            green_offset: read_i32(bytes, 4),
            tone_hz: read_i32(bytes, 8),
        }
    }

    pub fn write_to(&self, bytes: &mut [u8]) {
        bytes[0..4].copy_from_slice(&self.blue_offset.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.green_offset.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.tone_hz.to_le_bytes());
    }
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_le_bytes(raw)
}

pub struct GameMemory {
    initialized: bool,
    permanent: Box<[u8]>,
    transient: Box<[u8]>,
}

impl GameMemory {
    pub fn new(config: &MemoryConfig) -> Result<Self, CoreError> {
        if config.permanent_storage_size < GAME_STATE_SIZE {
            return Err(CoreError::ArenaTooSmall {
                region: "permanent",
                bytes: config.permanent_storage_size,
                required: GAME_STATE_SIZE,
            });
        }
        let permanent = allocate_region("permanent", config.permanent_storage_size)?;
        let transient = allocate_region("transient", config.transient_storage_size)?;
        log::info!(
            "Game memory allocated: {} bytes permanent, {} bytes transient",
            permanent.len(),
            transient.len()
        );
        Ok(Self {
            initialized: false,
            permanent,
            transient,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Populate default state the first time it is called; a no-op afterwards.
    pub fn initialize_if_needed(&mut self) {
        if self.initialized {
            return;
        }
        GameState {
            blue_offset: 0,
            green_offset: 0,
            tone_hz: DEFAULT_TONE_HZ,
        }
        .write_to(&mut self.permanent);
        self.initialized = true;
    }

    pub fn game_state(&self) -> GameState {
        GameState::read_from(&self.permanent)
    }

    pub fn store_game_state(&mut self, state: &GameState) {
        state.write_to(&mut self.permanent);
    }

    /// Load the state, let `f` mutate it, and write it back.
    pub fn with_game_state<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let mut state = self.game_state();
        let result = f(&mut state);
        self.store_game_state(&state);
        result
    }

    pub fn permanent_storage(&self) -> &[u8] {
        &self.permanent
    }

    pub fn transient_storage(&self) -> &[u8] {
        &self.transient
    }

    pub fn transient_storage_mut(&mut self) -> &mut [u8] {
        &mut self.transient
    }

    /// Overwrite permanent storage with a previously saved image. The image
    /// must be exactly the size of the region.
    ///
    /// An image taken before the first initialization carries a zero tone;
    /// it is reset to the default so the restored state is always playable.
    pub fn restore_permanent(&mut self, snapshot: &[u8]) -> Result<(), CoreError> {
        if snapshot.len() != self.permanent.len() {
            return Err(CoreError::SnapshotSize {
                expected: self.permanent.len(),
                actual: snapshot.len(),
            });
        }
        self.permanent.copy_from_slice(snapshot);
        self.initialized = true;
        self.with_game_state(|state| {
            if state.tone_hz <= 0 {
                log::warn!(
                    "Restored image has tone {} Hz; using {} Hz.",
                    state.tone_hz,
                    DEFAULT_TONE_HZ
                );
                state.tone_hz = DEFAULT_TONE_HZ;
            }
        });
        Ok(())
    }
}

fn allocate_region(region: &'static str, bytes: usize) -> Result<Box<[u8]>, CoreError> {
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(bytes)
        .map_err(|source| CoreError::ArenaAllocation {
            region,
            bytes,
            source,
        })?;
    storage.resize(bytes, 0u8);
    Ok(storage.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> MemoryConfig {
        MemoryConfig {
            permanent_storage_size: 64,
            transient_storage_size: 128,
        }
    }

    #[test]
    fn new_arena_is_zeroed_and_uninitialized() {
        let memory = GameMemory::new(&small_config()).expect("allocate");
        assert!(!memory.is_initialized());
        assert_eq!(memory.permanent_storage().len(), 64);
        assert_eq!(memory.transient_storage().len(), 128);
        assert!(memory.permanent_storage().iter().all(|&b| b == 0));
        assert!(memory.transient_storage().iter().all(|&b| b == 0));
        assert_eq!(memory.game_state(), GameState::default());
    }

    #[test]
    fn initialize_sets_defaults_once() {
        let mut memory = GameMemory::new(&small_config()).expect("allocate");
        memory.initialize_if_needed();
        assert!(memory.is_initialized());
        assert_eq!(memory.game_state().tone_hz, 256);

        memory.with_game_state(|state| {
            state.blue_offset = 9;
            state.tone_hz = 512;
        });
        memory.initialize_if_needed();
        let state = memory.game_state();
        assert_eq!(state.blue_offset, 9);
        assert_eq!(state.tone_hz, 512);
    }

    #[test]
    fn state_is_stored_little_endian_at_offset_zero() {
        let mut memory = GameMemory::new(&small_config()).expect("allocate");
        memory.store_game_state(&GameState {
            blue_offset: 1,
            green_offset: -1,
            tone_hz: 0x0102,
        });
        assert_eq!(
            &memory.permanent_storage()[..GAME_STATE_SIZE],
            &[1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0x02, 0x01, 0, 0]
        );
        assert!(memory.permanent_storage()[GAME_STATE_SIZE..]
            .iter()
            .all(|&b| b == 0));
    }

    #[test]
    fn permanent_region_must_fit_game_state() {
        let config = MemoryConfig {
            permanent_storage_size: GAME_STATE_SIZE - 1,
            transient_storage_size: 0,
        };
        match GameMemory::new(&config) {
            Err(CoreError::ArenaTooSmall { required, .. }) => {
                assert_eq!(required, GAME_STATE_SIZE)
            }
            other => panic!("expected ArenaTooSmall, got {:?}", other.err()),
        }
    }

    #[test]
    fn impossible_allocation_is_reported() {
        let config = MemoryConfig {
            permanent_storage_size: 64,
            transient_storage_size: usize::MAX,
        };
        let err = GameMemory::new(&config).err().expect("allocation must fail");
        assert!(matches!(
            err,
            CoreError::ArenaAllocation {
                region: "transient",
                ..
            }
        ));
    }

    #[test]
    fn restore_permanent_round_trips_snapshot() {
        let mut source = GameMemory::new(&small_config()).expect("allocate");
        source.initialize_if_needed();
        source.with_game_state(|state| state.green_offset = 77);
        let snapshot = source.permanent_storage().to_vec();

        let mut target = GameMemory::new(&small_config()).expect("allocate");
        target.restore_permanent(&snapshot).expect("restore");
        assert!(target.is_initialized());
        assert_eq!(target.game_state().green_offset, 77);
        assert_eq!(target.game_state().tone_hz, 256);
    }

    #[test]
    fn restore_permanent_repairs_zero_tone() {
        let mut memory = GameMemory::new(&small_config()).expect("allocate");
        memory.restore_permanent(&[0u8; 64]).expect("restore");
        assert!(memory.is_initialized());
        let state = memory.game_state();
        assert_eq!(state.tone_hz, DEFAULT_TONE_HZ);
        assert_eq!(state.blue_offset, 0);
        assert_eq!(state.green_offset, 0);
    }

    #[test]
    fn restore_permanent_rejects_wrong_size() {
        let mut memory = GameMemory::new(&small_config()).expect("allocate");
        let err = memory.restore_permanent(&[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SnapshotSize {
                expected: 64,
                actual: 10
            }
        ));
        assert!(!memory.is_initialized());
    }

    #[test]
    fn transient_storage_is_writable() {
        let mut memory = GameMemory::new(&small_config()).expect("allocate");
        memory.transient_storage_mut()[5] = 42;
        assert_eq!(memory.transient_storage()[5], 42);
    }
}
