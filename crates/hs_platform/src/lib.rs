pub mod audio;
pub mod counter;
pub mod debug_file;
pub mod error;
pub mod window;

pub use audio::{AudioDevice, SampleQueue, SilentAudio};
pub use counter::InstantCounter;
pub use debug_file::{read_entire_file, write_entire_file, DebugReadFileResult};
pub use error::PlatformError;
pub use window::{create_window, PlatformConfig};
