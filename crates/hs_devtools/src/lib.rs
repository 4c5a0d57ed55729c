pub mod debug_overlay;

pub use debug_overlay::{overlay_lines, DebugOverlay, OverlayActions, OverlayStats};
