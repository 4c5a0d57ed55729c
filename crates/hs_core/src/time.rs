//! Game time: the fixed-point game clock and the fixed-timestep accumulator.
//!
//! Simulated time is tracked as a 32.32 fixed-point seconds counter
//! (`Time64`) so that adding the same tick quantum thousands of times never
//! drifts the way an `f32` total would. Wall-clock frame time is fed into
//! `TimeState`, which hands out whole ticks via `should_step()`.

const FPS_SAMPLE_COUNT: usize = 60;
const FIXED_ONE: f64 = 4_294_967_296.0;

/// 64-bit fixed-point seconds: 32 bits of whole seconds, 32 bits of fraction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time64 {
    pub whole_seconds: u32,
    pub fraction: u32,
}

impl Time64 {
    pub const ZERO: Time64 = Time64 {
        whole_seconds: 0,
        fraction: 0,
    };

    pub fn from_u64(value: u64) -> Self {
        Self {
            whole_seconds: (value >> 32) as u32,
            fraction: (value & 0xFFFF_FFFF) as u32,
        }
    }

    pub fn to_u64(self) -> u64 {
        (u64::from(self.whole_seconds) << 32) | u64::from(self.fraction)
    }

    /// Advance by `addend` seconds. The increment is rounded to the nearest
    /// 1/2^32 s; carry out of the fraction lands in `whole_seconds`.
    /// `addend` must be non-negative.
    #[must_use]
    pub fn add_float(self, addend: f32) -> Self {
        let increment = (f64::from(addend) * FIXED_ONE + 0.5) as u64;
        Self::from_u64(self.to_u64().wrapping_add(increment))
    }

    pub fn as_secs_f64(self) -> f64 {
        f64::from(self.whole_seconds) + f64::from(self.fraction) / FIXED_ONE
    }
}

impl std::fmt::Display for Time64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

pub struct TimeState {
    pub tick_seconds: f32,
    /// Upper bound on a single frame's contribution to the accumulator.
    pub max_frame_time: f32,
    accumulator: f32,
    pub game_clock: Time64,
    pub tick_count: u64,
    pub frame_count: u64,
    pub ticks_this_frame: u32,
    pub real_dt: f32,

    fps_samples: [f32; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f32,
    pub smoothed_frame_time_ms: f32,

    report_delay: f32,
    frames_since_report: u32,
    pub estimated_fps: u32,
}

impl TimeState {
    pub fn new(tick_seconds: f32, max_frame_time: f32) -> Self {
        Self {
            tick_seconds,
            max_frame_time,
            accumulator: 0.0,
            game_clock: Time64::ZERO,
            tick_count: 0,
            frame_count: 0,
            ticks_this_frame: 0,
            real_dt: 0.0,
            fps_samples: [tick_seconds; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / tick_seconds,
            smoothed_frame_time_ms: tick_seconds * 1000.0,
            report_delay: 0.0,
            frames_since_report: 0,
            estimated_fps: 0,
        }
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn begin_frame(&mut self, frame_time: f32) {
        self.real_dt = frame_time.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > self.max_frame_time {
            log::warn!(
                "Frame took {:.1}ms, clamping to {:.1}ms",
                self.real_dt * 1000.0,
                self.max_frame_time * 1000.0
            );
            self.real_dt = self.max_frame_time;
        }

        self.accumulator += self.real_dt;
        self.ticks_this_frame = 0;
        self.frame_count += 1;

        // FPS smoothing
        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f32 = self.fps_samples.iter().sum::<f32>() / FPS_SAMPLE_COUNT as f32;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };

        self.report_delay += self.real_dt;
        self.frames_since_report += 1;
        if self.report_delay > 1.0 {
            self.estimated_fps = self.frames_since_report;
            log::debug!("Estimated FPS: {}", self.estimated_fps);
            self.report_delay = 0.0;
            self.frames_since_report = 0;
        }
    }

    /// Consume one tick from the accumulator if more than a full tick is
    /// banked, advancing the game clock by the tick quantum.
    pub fn should_step(&mut self) -> bool {
        if self.accumulator > self.tick_seconds {
            self.accumulator -= self.tick_seconds;
            self.game_clock = self.game_clock.add_float(self.tick_seconds);
            self.tick_count += 1;
            self.ticks_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Drop banked time, e.g. while the simulation is paused.
    pub fn discard_accumulator(&mut self) {
        self.accumulator = 0.0;
    }

    /// Account for one tick regardless of the accumulator.
    pub fn force_step(&mut self) {
        self.game_clock = self.game_clock.add_float(self.tick_seconds);
        self.tick_count += 1;
        self.ticks_this_frame += 1;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(1.0 / 30.0, 0.25)
    }
}
