//! The fixed-timestep driver.
//!
//! Once per presented frame the shell calls `run_frame()`:
//!
//!   1. measure wall-clock time since the previous frame (`PerformanceCounter`)
//!   2. feed it to the accumulator and run `update_game` once per whole tick
//!   3. size the audio request from the device backlog (`AudioQueue`)
//!   4. `fill_buffers` exactly once, then queue the produced audio
//!
//! After `run_frame()` returns the shell presents `session.offscreen`. Once the
//! driver reaches `ShouldClose` the shell leaves its loop; the frame that
//! observed the quit request is still filled and flushed.

use crate::buffers::{OffscreenBuffer, SoundBuffer};
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::game::{fill_buffers, update_game};
use crate::input::{GameInput, InputState};
use crate::memory::GameMemory;
use crate::replay::{ReplayPlayback, ReplaySequence};
use crate::time::TimeState;

/// Monotonic high-resolution clock owned by the platform.
pub trait PerformanceCounter {
    fn counter(&self) -> u64;
    /// Counter ticks per second.
    fn frequency(&self) -> u64;
}

/// Push-style audio output with a backlog query.
pub trait AudioQueue {
    fn queued_bytes(&self) -> u32;
    fn queue_audio(&mut self, bytes: &[u8]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    Running,
    ShouldClose,
}

/// Everything the game owns for the lifetime of a run.
pub struct Session {
    pub memory: GameMemory,
    pub offscreen: OffscreenBuffer,
    pub sound: SoundBuffer,
    pub input: InputState,
    pub playback: Option<ReplayPlayback>,
    pub recording: Option<ReplaySequence>,
}

impl Session {
    pub fn new(config: &EngineConfig, audio_enabled: bool) -> Result<Self, CoreError> {
        let memory = GameMemory::new(&config.memory)?;
        Ok(Self {
            memory,
            offscreen: OffscreenBuffer::new(config.window.width as i32, config.window.height as i32),
            sound: SoundBuffer::new(config.samples_per_sec, audio_enabled),
            input: InputState::new(),
            playback: None,
            recording: None,
        })
    }

    /// The input for the next tick: recorded input while a replay lasts,
    /// live keyboard input otherwise.
    fn next_tick_input(&mut self) -> GameInput {
        if let Some(playback) = self.playback.as_mut() {
            if let Some(input) = playback.next_input() {
                return input;
            }
            log::info!("Replay finished, returning to live input");
            self.playback = None;
        }
        *self.input.game()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub samples_written: i32,
}

pub struct FixedTimestepDriver {
    pub time: TimeState,
    audio_latency_ticks: f32,
    status: DriverStatus,
    last_counter: Option<u64>,
    pub paused: bool,
    single_step_requested: bool,
}

impl FixedTimestepDriver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            time: TimeState::new(config.tick_seconds(), config.max_frame_time),
            audio_latency_ticks: config.audio_latency_ticks,
            status: DriverStatus::Running,
            last_counter: None,
            paused: false,
            single_step_requested: false,
        }
    }

    pub fn status(&self) -> DriverStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == DriverStatus::Running
    }

    pub fn request_close(&mut self) {
        if self.status == DriverStatus::Running {
            log::info!("Close requested after {} ticks", self.time.tick_count);
        }
        self.status = DriverStatus::ShouldClose;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!(
            "Simulation {}",
            if self.paused { "PAUSED" } else { "RESUMED" }
        );
    }

    /// Run exactly one tick on the next frame while paused.
    pub fn request_single_step(&mut self) {
        self.single_step_requested = true;
    }

    /// Seconds elapsed since the previous call; zero on the first call.
    pub fn measure_frame_time(&mut self, counter: &impl PerformanceCounter) -> f32 {
        let now = counter.counter();
        let elapsed = match self.last_counter {
            Some(last) => now.saturating_sub(last),
            None => 0,
        };
        self.last_counter = Some(now);
        elapsed as f32 / counter.frequency().max(1) as f32
    }

    /// One full presentation frame against the platform's clock and audio
    /// device.
    pub fn run_frame<A: AudioQueue + ?Sized>(
        &mut self,
        session: &mut Session,
        counter: &impl PerformanceCounter,
        audio: &mut A,
    ) -> FrameReport {
        let frame_time = self.measure_frame_time(counter);
        let report = self.advance(session, frame_time, audio.queued_bytes());
        if session.sound.enabled && report.samples_written > 0 {
            audio.queue_audio(session.sound.filled());
        }
        report
    }

    /// Steps 2-4 of a frame with the frame time and backlog already measured.
    pub fn advance(
        &mut self,
        session: &mut Session,
        frame_time: f32,
        queued_audio_bytes: u32,
    ) -> FrameReport {
        if session.input.quit_requested() {
            self.request_close();
        }

        self.time.begin_frame(frame_time);
        let mut ticks = 0;
        if self.paused {
            self.time.discard_accumulator();
            if std::mem::take(&mut self.single_step_requested) {
                self.time.force_step();
                self.tick(session);
                ticks = 1;
            }
        } else {
            while self.time.should_step() {
                self.tick(session);
                ticks += 1;
            }
        }
        if ticks > 0 {
            session.input.consume_transitions();
        }

        if session.sound.enabled {
            let target = session
                .sound
                .target_queue_bytes(self.time.tick_seconds, self.audio_latency_ticks);
            let queued = i32::try_from(queued_audio_bytes).unwrap_or(i32::MAX);
            session.sound.request_samples(target, queued);
        } else {
            session.sound.samples_needed = 0;
        }
        fill_buffers(&mut session.memory, &mut session.offscreen, &mut session.sound);
        session.input.end_frame();

        FrameReport {
            ticks,
            samples_written: session.sound.samples_needed,
        }
    }

    fn tick(&mut self, session: &mut Session) {
        let input = session.next_tick_input();
        if let Some(recording) = session.recording.as_mut() {
            recording.record(&input);
        }
        update_game(&mut session.memory, &input);
    }
}
