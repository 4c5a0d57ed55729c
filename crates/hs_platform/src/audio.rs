//! Queued audio output on top of cpal's pull-style callback.
//!
//! The game pushes interleaved little-endian i16 stereo bytes and asks how
//! many bytes are still waiting. The device callback pops samples from the
//! same shared queue and pads with silence when it runs dry.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use hs_core::buffers::STEREO_CHANNELS;
use hs_core::AudioQueue;

use crate::error::PlatformError;

const BYTES_PER_CHANNEL_SAMPLE: usize = 2;

/// Interleaved i16 samples shared with the device callback.
#[derive(Clone, Default)]
pub struct SampleQueue {
    samples: Arc<Mutex<VecDeque<i16>>>,
}

impl SampleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<i16>> {
        // A panicking callback leaves plain sample data behind; keep using it.
        match self.samples.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn queued_bytes(&self) -> u32 {
        let bytes = self.lock().len() * BYTES_PER_CHANNEL_SAMPLE;
        u32::try_from(bytes).unwrap_or(u32::MAX)
    }

    /// Append little-endian i16 samples. A trailing odd byte is ignored.
    pub fn push_bytes(&self, bytes: &[u8]) {
        let mut queue = self.lock();
        queue.extend(
            bytes
                .chunks_exact(BYTES_PER_CHANNEL_SAMPLE)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
        );
    }

    /// Fill `out` from the front of the queue, padding with silence.
    /// Returns the number of queued samples consumed.
    pub fn drain_into<T: Sample + FromSample<i16>>(&self, out: &mut [T]) -> usize {
        let mut queue = self.lock();
        let available = queue.len().min(out.len());
        for (slot, sample) in out.iter_mut().zip(queue.drain(..available)) {
            *slot = T::from_sample(sample);
        }
        for slot in &mut out[available..] {
            *slot = T::EQUILIBRIUM;
        }
        available
    }
}

/// The default output device playing from a `SampleQueue`.
pub struct AudioDevice {
    queue: SampleQueue,
    _stream: cpal::Stream,
}

impl AudioDevice {
    pub fn open(samples_per_sec: i32) -> Result<Self, PlatformError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlatformError::NoAudioDevice)?;
        let sample_format = device.default_output_config()?.sample_format();
        let sample_rate = samples_per_sec.max(1) as u32;
        let config = cpal::StreamConfig {
            channels: STEREO_CHANNELS as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let queue = SampleQueue::new();
        let stream = match sample_format {
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, queue.clone())?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, queue.clone())?,
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, queue.clone())?,
            other => return Err(PlatformError::AudioSampleFormat(other)),
        };
        stream.play()?;

        log::info!(
            "Audio device '{}' opened: {} Hz stereo, {:?} samples",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            sample_format
        );
        Ok(Self {
            queue,
            _stream: stream,
        })
    }
}

impl AudioQueue for AudioDevice {
    fn queued_bytes(&self) -> u32 {
        self.queue.queued_bytes()
    }

    fn queue_audio(&mut self, bytes: &[u8]) {
        self.queue.push_bytes(bytes);
    }
}

/// Stand-in used when no device could be opened: nothing is ever queued.
#[derive(Default)]
pub struct SilentAudio;

impl AudioQueue for SilentAudio {
    fn queued_bytes(&self) -> u32 {
        0
    }

    fn queue_audio(&mut self, _bytes: &[u8]) {}
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    queue: SampleQueue,
) -> Result<cpal::Stream, PlatformError>
where
    T: SizedSample + FromSample<i16>,
{
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            queue.drain_into(data);
        },
        |err| log::error!("Audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn pushed_bytes_count_as_queued() {
        let queue = SampleQueue::new();
        assert_eq!(queue.queued_bytes(), 0);
        queue.push_bytes(&bytes_of(&[1, -1, 2, -2]));
        assert_eq!(queue.queued_bytes(), 8);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let queue = SampleQueue::new();
        queue.push_bytes(&[1, 0, 7]);
        assert_eq!(queue.queued_bytes(), 2);
    }

    #[test]
    fn drain_pops_in_order_and_pads_with_silence() {
        let queue = SampleQueue::new();
        queue.push_bytes(&bytes_of(&[100, 200, 300]));

        let mut out = [9i16; 5];
        assert_eq!(queue.drain_into(&mut out), 3);
        assert_eq!(out, [100, 200, 300, 0, 0]);
        assert_eq!(queue.queued_bytes(), 0);
    }

    #[test]
    fn partial_drain_leaves_the_rest_queued() {
        let queue = SampleQueue::new();
        queue.push_bytes(&bytes_of(&[1, 2, 3, 4]));
        let mut out = [0i16; 2];
        queue.drain_into(&mut out);
        assert_eq!(out, [1, 2]);
        assert_eq!(queue.queued_bytes(), 4);
    }

    #[test]
    fn drain_converts_to_float() {
        let queue = SampleQueue::new();
        queue.push_bytes(&bytes_of(&[i16::MIN, 0]));
        let mut out = [1.0f32; 3];
        queue.drain_into(&mut out);
        assert_eq!(out[0], -1.0);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn clones_share_one_queue() {
        let queue = SampleQueue::new();
        let callback_side = queue.clone();
        queue.push_bytes(&bytes_of(&[5, 6]));
        let mut out = [0i16; 2];
        callback_side.drain_into(&mut out);
        assert_eq!(queue.queued_bytes(), 0);
    }

    #[test]
    fn silent_audio_never_reports_backlog() {
        let mut audio = SilentAudio;
        audio.queue_audio(&[1, 2, 3, 4]);
        assert_eq!(audio.queued_bytes(), 0);
    }
}
