//! Debug overlay rendered via egui on top of the presented frame.
//!
//! egui needs a three-phase render split because `egui_wgpu::Renderer::render()`
//! takes a `RenderPass<'static>`, while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! UI logic only runs while `visible` (F3). Window events are always routed
//! through egui so a visible overlay can take clicks.

use hs_core::{GameState, TimeState};
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub game_state: GameState,
    pub audio_enabled: bool,
    /// Stereo frames generated on the last presented frame.
    pub samples_written: i32,
    pub queued_audio_bytes: u32,
    pub replay_active: bool,
    pub recording: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayActions {
    pub toggle_pause: bool,
    /// Advance one fixed tick while paused.
    pub single_step: bool,
    pub save_snapshot: bool,
    pub restore_snapshot: bool,
}

/// Text rows shown in the overlay window, in display order.
pub fn overlay_lines(time: &TimeState, stats: &OverlayStats) -> Vec<String> {
    let mut lines = vec![
        format!("FPS: {:.1}", time.smoothed_fps),
        format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms),
        format!("Ticks this frame: {}", time.ticks_this_frame),
        format!("Total ticks: {}", time.tick_count),
        format!("Frame: {}", time.frame_count),
        format!("Game clock: {}", time.game_clock),
        format!(
            "Offsets: blue {} green {}",
            stats.game_state.blue_offset, stats.game_state.green_offset
        ),
        format!("Tone: {} Hz", stats.game_state.tone_hz),
    ];
    if stats.audio_enabled {
        lines.push(format!(
            "Audio: {} samples, {} bytes queued",
            stats.samples_written, stats.queued_audio_bytes
        ));
    } else {
        lines.push("Audio: disabled".to_string());
    }
    if stats.replay_active {
        lines.push("Replay: playing".to_string());
    }
    if stats.recording {
        lines.push("Replay: recording".to_string());
    }
    lines
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        stats: &OverlayStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        OverlayActions,
    ) {
        let mut actions = OverlayActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if !self.visible {
                return;
            }
            egui::Window::new("Debug")
                .default_pos([10.0, 10.0])
                .show(ctx, |ui| {
                    for line in overlay_lines(time, stats) {
                        ui.label(line);
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        let pause_label = if stats.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_label).clicked() {
                            actions.toggle_pause = true;
                        }
                        if stats.paused && ui.button("Step").clicked() {
                            actions.single_step = true;
                        }
                    });
                    if stats.paused {
                        ui.label("\u{23f8} PAUSED");
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("Save snapshot (F5)").clicked() {
                            actions.save_snapshot = true;
                        }
                        if ui.button("Restore (F9)").clicked() {
                            actions.restore_snapshot = true;
                        }
                    });
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> OverlayStats {
        OverlayStats {
            game_state: GameState {
                blue_offset: -3,
                green_offset: 12,
                tone_hz: 256,
            },
            audio_enabled: true,
            samples_written: 1470,
            queued_audio_bytes: 5880,
            ..OverlayStats::default()
        }
    }

    #[test]
    fn lines_show_game_state_and_audio() {
        let time = TimeState::default();
        let lines = overlay_lines(&time, &stats());
        assert!(lines.contains(&"Offsets: blue -3 green 12".to_string()));
        assert!(lines.contains(&"Tone: 256 Hz".to_string()));
        assert!(lines.contains(&"Audio: 1470 samples, 5880 bytes queued".to_string()));
        assert!(lines.contains(&"Game clock: 0.000s".to_string()));
    }

    #[test]
    fn disabled_audio_and_replay_flags() {
        let time = TimeState::default();
        let stats = OverlayStats {
            audio_enabled: false,
            replay_active: true,
            ..stats()
        };
        let lines = overlay_lines(&time, &stats);
        assert!(lines.contains(&"Audio: disabled".to_string()));
        assert!(lines.contains(&"Replay: playing".to_string()));
        assert!(!lines.contains(&"Replay: recording".to_string()));
    }

    #[test]
    fn tick_counters_follow_time_state() {
        let mut time = TimeState::new(0.25, 1.0);
        time.begin_frame(0.6);
        while time.should_step() {}
        let lines = overlay_lines(&time, &OverlayStats::default());
        assert_eq!(lines[2], "Ticks this frame: 2");
        assert_eq!(lines[3], "Total ticks: 2");
        assert_eq!(lines[5], "Game clock: 0.500s");
    }
}
