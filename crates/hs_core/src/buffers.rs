//! The two buffers handed between the platform shell and the game each frame.
//!
//! `OffscreenBuffer` is a packed 32-bit BGRx image (`pitch` bytes per row,
//! little-endian texels). `SoundBuffer` holds interleaved signed 16-bit stereo
//! frames; the shell sizes each fill through `request_samples()` from its
//! queued-audio backlog and then queues `filled()` to the device.

/// Bytes per texel in the offscreen buffer.
pub const BYTES_PER_PIXEL: i32 = 4;
/// The tone is always written as interleaved left/right pairs.
pub const STEREO_CHANNELS: i32 = 2;
const BYTES_PER_CHANNEL_SAMPLE: i32 = 2;

pub struct OffscreenBuffer {
    pub memory: Vec<u8>,
    pub width: i32,
    pub height: i32,
    pub pitch: i32,
}

impl OffscreenBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_pitch(width, height, width.max(0) * BYTES_PER_PIXEL)
    }

    /// Rows are `pitch` bytes apart; a pitch narrower than one row of texels
    /// is widened to fit.
    pub fn with_pitch(width: i32, height: i32, pitch: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let pitch = pitch.max(width * BYTES_PER_PIXEL);
        Self {
            memory: vec![0; pitch as usize * height as usize],
            width,
            height,
            pitch,
        }
    }

    /// Reallocate for a new surface size. Returns false if the size is unchanged.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        *self = Self::new(width, height);
        true
    }

    pub fn pixel(&self, x: i32, y: i32) -> u32 {
        let offset = (y * self.pitch + x * BYTES_PER_PIXEL) as usize;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.memory[offset..offset + 4]);
        u32::from_le_bytes(raw)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, value: u32) {
        let offset = (y * self.pitch + x * BYTES_PER_PIXEL) as usize;
        self.memory[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }
}

pub struct SoundBuffer {
    pub memory: Vec<u8>,
    pub samples_per_sec: i32,
    /// Running sample index into the current wave period, in `1..=period`.
    pub t: i32,
    /// Bytes per stereo frame.
    pub bytes_per_sample: i32,
    pub samples_needed: i32,
    pub enabled: bool,
}

impl SoundBuffer {
    /// A disabled buffer owns no storage. An enabled one can hold a full
    /// second of audio per channel.
    pub fn new(samples_per_sec: i32, enabled: bool) -> Self {
        let bytes_per_sample = BYTES_PER_CHANNEL_SAMPLE * STEREO_CHANNELS;
        let capacity = if enabled {
            samples_per_sec.max(0) as usize * bytes_per_sample as usize * STEREO_CHANNELS as usize
        } else {
            0
        };
        Self {
            memory: vec![0; capacity],
            samples_per_sec,
            t: 1,
            bytes_per_sample,
            samples_needed: 0,
            enabled,
        }
    }

    pub fn capacity_samples(&self) -> i32 {
        (self.memory.len() / self.bytes_per_sample as usize) as i32
    }

    /// Queue depth the shell aims to keep on the device, in bytes.
    pub fn target_queue_bytes(&self, tick_seconds: f32, latency_ticks: f32) -> i32 {
        ((self.samples_per_sec * self.bytes_per_sample) as f32 * tick_seconds * latency_ticks
            + 0.5) as i32
    }

    /// Size the next fill from the device backlog. A backlog at or above the
    /// target yields zero samples; the request never exceeds capacity.
    pub fn request_samples(&mut self, target_queue_bytes: i32, queued_bytes: i32) -> i32 {
        let bytes_to_write = target_queue_bytes.saturating_sub(queued_bytes);
        self.samples_needed = if bytes_to_write > 0 {
            (bytes_to_write / self.bytes_per_sample).min(self.capacity_samples())
        } else {
            0
        };
        self.samples_needed
    }

    pub fn bytes_needed(&self) -> usize {
        self.samples_needed.max(0) as usize * self.bytes_per_sample as usize
    }

    /// The bytes produced by the last fill.
    pub fn filled(&self) -> &[u8] {
        &self.memory[..self.bytes_needed().min(self.memory.len())]
    }
}
