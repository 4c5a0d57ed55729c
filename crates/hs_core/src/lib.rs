pub mod buffers;
pub mod config;
pub mod driver;
pub mod error;
pub mod game;
pub mod input;
pub mod memory;
pub mod replay;
pub mod time;

pub use buffers::{OffscreenBuffer, SoundBuffer};
pub use config::{load_config, EngineConfig, WindowConfig};
pub use driver::{AudioQueue, DriverStatus, FixedTimestepDriver, FrameReport, PerformanceCounter, Session};
pub use error::CoreError;
pub use game::{fill_buffers, update_game};
pub use input::{ButtonState, GameInput, InputState, Key};
pub use memory::{GameMemory, GameState, MemoryConfig};
pub use replay::{ReplayPlayback, ReplaySequence};
pub use time::{Time64, TimeState};
