//! Handmade -- platform shell and entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Everything the game
//! owns lives in a `Session` that the fixed-timestep driver advances inside
//! `RedrawRequested`:
//!
//!   1. shell keys (F3 overlay, F5/F9 snapshots) read this frame's key edges
//!   2. `run_frame()` -- measure time, tick the game, fill video and audio
//!   3. upload the offscreen buffer, blit it, composite the egui overlay
//!
//! Escape or closing the window makes the driver report `ShouldClose`; that
//! frame is still presented before the loop exits.

mod launch;
mod snapshot;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use hs_core::replay::{load_replay_from_path, save_replay_to_path};
use hs_core::{
    load_config, AudioQueue, EngineConfig, FixedTimestepDriver, FrameReport, Key, ReplayPlayback,
    ReplaySequence, Session,
};
use hs_devtools::{DebugOverlay, OverlayStats};
use hs_platform::window::PlatformConfig;
use hs_platform::{AudioDevice, InstantCounter, SilentAudio};
use hs_render::{BlitPipeline, GpuContext};
use launch::LaunchOptions;
use snapshot::{restore_snapshot, save_snapshot, SNAPSHOT_PATH};

/// Game-side state; exists before and independently of the window.
struct Simulation {
    session: Session,
    driver: FixedTimestepDriver,
    audio: Box<dyn AudioQueue>,
    counter: InstantCounter,
    last_report: FrameReport,
    record_path: Option<PathBuf>,
}

impl Simulation {
    fn new(config: &EngineConfig, options: &LaunchOptions) -> Result<Self, hs_core::CoreError> {
        let (audio, audio_enabled): (Box<dyn AudioQueue>, bool) =
            match AudioDevice::open(config.samples_per_sec) {
                Ok(device) => (Box::new(device), true),
                Err(err) => {
                    log::warn!("{err}; audio disabled.");
                    (Box::new(SilentAudio), false)
                }
            };

        let mut session = Session::new(config, audio_enabled)?;
        let driver = FixedTimestepDriver::new(config);

        if let Some(path) = &options.replay {
            match load_replay_from_path(path) {
                Ok(replay) => {
                    if (replay.tick_seconds - driver.time.tick_seconds).abs() > f32::EPSILON {
                        log::warn!(
                            "Replay '{}' was recorded at {:.4}s ticks, running at {:.4}s",
                            path.display(),
                            replay.tick_seconds,
                            driver.time.tick_seconds
                        );
                    }
                    log::info!(
                        "Replaying {} ticks from '{}'",
                        replay.tick_count(),
                        path.display()
                    );
                    session.playback = Some(ReplayPlayback::new(&replay));
                }
                Err(err) => log::error!("{err}; continuing with live input."),
            }
        }
        if options.record.is_some() {
            session.recording = Some(ReplaySequence::new(driver.time.tick_seconds));
        }

        Ok(Self {
            session,
            driver,
            audio,
            counter: InstantCounter::new(),
            last_report: FrameReport::default(),
            record_path: options.record.clone(),
        })
    }

    fn handle_shell_keys(&mut self, overlay: &mut DebugOverlay) {
        let input = &self.session.input;
        if input.is_just_pressed(Key::F3) {
            overlay.toggle();
        }
        if input.is_just_pressed(Key::F5) {
            self.save_snapshot();
        }
        if input.is_just_pressed(Key::F9) {
            self.restore_snapshot();
        }
    }

    fn save_snapshot(&self) {
        if let Err(err) = save_snapshot(Path::new(SNAPSHOT_PATH), &self.session.memory) {
            log::error!("Snapshot save failed: {err}");
        }
    }

    fn restore_snapshot(&mut self) {
        if let Err(err) = restore_snapshot(Path::new(SNAPSHOT_PATH), &mut self.session.memory) {
            log::error!("Snapshot restore failed: {err}");
        }
    }

    fn overlay_stats(&self) -> OverlayStats {
        OverlayStats {
            game_state: self.session.memory.game_state(),
            audio_enabled: self.session.sound.enabled,
            samples_written: self.last_report.samples_written,
            queued_audio_bytes: self.audio.queued_bytes(),
            replay_active: self.session.playback.is_some(),
            recording: self.session.recording.is_some(),
            paused: self.driver.paused,
        }
    }

    /// Flush anything that must outlive the process.
    fn finish(&mut self) {
        let (Some(path), Some(recording)) = (&self.record_path, self.session.recording.take())
        else {
            return;
        };
        if recording.frames.is_empty() {
            log::warn!("No ticks recorded; '{}' not written", path.display());
            return;
        }
        match save_replay_to_path(path, &recording) {
            Ok(()) => log::info!(
                "Recorded {} ticks to '{}'",
                recording.tick_count(),
                path.display()
            ),
            Err(err) => log::error!("{err}"),
        }
    }
}

struct Graphics {
    window: Arc<Window>,
    gpu: GpuContext,
    blit: BlitPipeline,
    debug_overlay: DebugOverlay,
}

impl Graphics {
    fn new(window: Arc<Window>) -> Self {
        let gpu = GpuContext::new(window.clone());
        let blit = BlitPipeline::new(&gpu);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);
        Self {
            window,
            gpu,
            blit,
            debug_overlay,
        }
    }

    fn render(&mut self, sim: &mut Simulation) {
        if self.gpu.size.0 == 0 || self.gpu.size.1 == 0 {
            return;
        }
        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        self.blit.upload(&self.gpu, &sim.session.offscreen);

        let stats = sim.overlay_stats();
        let (egui_primitives, egui_textures_delta, overlay_actions) =
            self.debug_overlay
                .prepare(&self.window, &sim.driver.time, &stats);

        if overlay_actions.toggle_pause {
            sim.driver.toggle_pause();
        }
        if overlay_actions.single_step {
            sim.driver.request_single_step();
        }
        if overlay_actions.save_snapshot {
            sim.save_snapshot();
        }
        if overlay_actions.restore_snapshot {
            sim.restore_snapshot();
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.size.0, self.gpu.size.1],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.blit.draw(&mut encoder, &view);

        self.debug_overlay.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &egui_primitives,
            &egui_textures_delta,
            &screen_descriptor,
        );

        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();

            self.debug_overlay
                .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
        }

        self.debug_overlay.cleanup(&egui_textures_delta);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    platform: PlatformConfig,
    sim: Simulation,
    graphics: Option<Graphics>,
}

impl App {
    fn new(config: &EngineConfig, sim: Simulation) -> Self {
        Self {
            platform: PlatformConfig::from(&config.window),
            sim,
            graphics: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        let window = hs_platform::window::create_window(event_loop, &self.platform);
        let graphics = Graphics::new(window);
        let (w, h) = graphics.gpu.size;
        if w > 0 && h > 0 {
            self.sim.session.offscreen.resize(w as i32, h as i32);
        }
        self.graphics = Some(graphics);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };
        let sim = &mut self.sim;

        let egui_consumed = graphics
            .debug_overlay
            .handle_window_event(&graphics.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested.");
                sim.session.input.request_quit();
                graphics.window.request_redraw();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    graphics.gpu.resize(w, h);
                    sim.session.offscreen.resize(w as i32, h as i32);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => sim.session.input.key_down(engine_key),
                            ElementState::Released => sim.session.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::Focused(false) => {
                // Keys released while unfocused never reach us.
                for key in [Key::W, Key::A, Key::S, Key::D] {
                    sim.session.input.key_up(key);
                }
            }

            WindowEvent::RedrawRequested => {
                sim.handle_shell_keys(&mut graphics.debug_overlay);
                sim.last_report =
                    sim.driver
                        .run_frame(&mut sim.session, &sim.counter, sim.audio.as_mut());

                graphics.render(sim);

                if !sim.driver.is_running() {
                    sim.finish();
                    log::info!(
                        "Exiting after {} ticks ({} game time).",
                        sim.driver.time.tick_count,
                        sim.driver.time.game_clock
                    );
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F5 => Some(Key::F5),
        KeyCode::F9 => Some(Key::F9),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Handmade starting...");

    let options = match launch::parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n{}", launch::USAGE);
            std::process::exit(2);
        }
    };
    let config = load_config();
    let sim = match Simulation::new(&config, &options) {
        Ok(sim) => sim,
        Err(err) => {
            log::error!("Failed to start session: {err}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&config, sim);
    event_loop.run_app(&mut app).expect("Event loop error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_shell_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::KeyA), Some(Key::A));
        assert_eq!(map_key(KeyCode::KeyS), Some(Key::S));
        assert_eq!(map_key(KeyCode::KeyD), Some(Key::D));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::F3), Some(Key::F3));
        assert_eq!(map_key(KeyCode::F5), Some(Key::F5));
        assert_eq!(map_key(KeyCode::F9), Some(Key::F9));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(map_key(KeyCode::Space), None);
        assert_eq!(map_key(KeyCode::ArrowUp), None);
    }
}
