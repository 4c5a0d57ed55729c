use std::sync::Arc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use hs_core::WindowConfig;

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig::from(&WindowConfig::default())
    }
}

impl From<&WindowConfig> for PlatformConfig {
    fn from(window: &WindowConfig) -> Self {
        Self {
            title: window.title.clone(),
            width: window.width,
            height: window.height,
            resizable: true,
        }
    }
}

pub fn create_window(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> Arc<Window> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height))
        .with_resizable(config.resizable);

    let window = event_loop
        .create_window(attrs)
        .expect("Failed to create window");
    log::info!(
        "Window created: '{}' {}x{}",
        config.title,
        config.width,
        config.height
    );
    Arc::new(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_config_follows_window_config() {
        let window = WindowConfig {
            title: "Gradient".to_string(),
            width: 320,
            height: 200,
        };
        let config = PlatformConfig::from(&window);
        assert_eq!(config.title, "Gradient");
        assert_eq!((config.width, config.height), (320, 200));
        assert!(config.resizable);
    }

    #[test]
    fn default_matches_engine_defaults() {
        let config = PlatformConfig::default();
        assert_eq!(config.title, "Handmade");
        assert_eq!((config.width, config.height), (1024, 768));
    }
}
