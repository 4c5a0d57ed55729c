//! The game: a keyboard-scrolled gradient and a sine tone.
//!
//! `update_game` runs once per fixed tick and only touches arena state.
//! `fill_buffers` runs once per presented frame and is a pure function of that
//! state (plus the sound buffer's running phase).

use std::f32::consts::TAU;

use crate::buffers::{OffscreenBuffer, SoundBuffer, BYTES_PER_PIXEL};
use crate::input::GameInput;
use crate::memory::{GameMemory, GameState};

pub const TONE_VOLUME: f32 = 6000.0;

pub fn update_game(memory: &mut GameMemory, input: &GameInput) {
    memory.initialize_if_needed();
    memory.with_game_state(|state| {
        if input.speed_up.ended_down {
            state.green_offset = state.green_offset.wrapping_add(1);
        }
        if input.speed_down.ended_down {
            state.green_offset = state.green_offset.wrapping_sub(1);
        }
        if input.strafe_left.ended_down {
            state.blue_offset = state.blue_offset.wrapping_add(1);
        }
        if input.strafe_right.ended_down {
            state.blue_offset = state.blue_offset.wrapping_sub(1);
        }
    });
}

pub fn fill_buffers(memory: &mut GameMemory, offscreen: &mut OffscreenBuffer, sound: &mut SoundBuffer) {
    memory.initialize_if_needed();
    let state = memory.game_state();
    render_weird_gradient(&state, offscreen);
    if sound.enabled {
        output_sine(&state, sound);
    }
}

/// Blue follows x, green follows y; both wrap every 256 texels.
pub fn render_weird_gradient(state: &GameState, buffer: &mut OffscreenBuffer) {
    let pitch = buffer.pitch as usize;
    let width = buffer.width as usize;
    if pitch == 0 {
        return;
    }
    for (y, row) in buffer
        .memory
        .chunks_exact_mut(pitch)
        .take(buffer.height as usize)
        .enumerate()
    {
        let green = (y as i32).wrapping_add(state.green_offset) as u8;
        for (x, texel) in row
            .chunks_exact_mut(BYTES_PER_PIXEL as usize)
            .take(width)
            .enumerate()
        {
            let blue = (x as i32).wrapping_add(state.blue_offset) as u8;
            let pixel = (u32::from(green) << 8) | u32::from(blue);
            texel.copy_from_slice(&pixel.to_le_bytes());
        }
    }
}

/// Write `samples_needed` stereo frames of the tone. The phase `t` wraps back
/// to 1 once it passes the wave period.
pub fn output_sine(state: &GameState, buffer: &mut SoundBuffer) {
    let tone_hz = state.tone_hz.max(1);
    let wave_period = (buffer.samples_per_sec / tone_hz).max(1);
    let samples = buffer.samples_needed.clamp(0, buffer.capacity_samples()) as usize;

    let SoundBuffer {
        memory,
        t,
        bytes_per_sample,
        ..
    } = buffer;
    for frame in memory
        .chunks_exact_mut(*bytes_per_sample as usize)
        .take(samples)
    {
        let sine_value = (TAU * *t as f32 / wave_period as f32).sin();
        let sample = (sine_value * TONE_VOLUME).round() as i16;
        let bytes = sample.to_le_bytes();
        frame[0..2].copy_from_slice(&bytes);
        frame[2..4].copy_from_slice(&bytes);

        *t += 1;
        if *t > wave_period {
            *t = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonState;
    use crate::memory::MemoryConfig;

    fn memory() -> GameMemory {
        GameMemory::new(&MemoryConfig {
            permanent_storage_size: 64,
            transient_storage_size: 0,
        })
        .expect("allocate")
    }

    fn held() -> ButtonState {
        ButtonState {
            half_transition_count: 0,
            ended_down: true,
        }
    }

    fn read_frame(buffer: &SoundBuffer, index: usize) -> (i16, i16) {
        let base = index * buffer.bytes_per_sample as usize;
        let m = &buffer.memory;
        (
            i16::from_le_bytes([m[base], m[base + 1]]),
            i16::from_le_bytes([m[base + 2], m[base + 3]]),
        )
    }

    #[test]
    fn first_update_initializes_tone() {
        let mut memory = memory();
        update_game(&mut memory, &GameInput::default());
        assert!(memory.is_initialized());
        assert_eq!(
            memory.game_state(),
            GameState {
                blue_offset: 0,
                green_offset: 0,
                tone_hz: 256
            }
        );
    }

    #[test]
    fn held_buttons_move_offsets() {
        let mut memory = memory();
        let input = GameInput {
            speed_up: held(),
            strafe_left: held(),
            ..GameInput::default()
        };
        for _ in 0..3 {
            update_game(&mut memory, &input);
        }
        let state = memory.game_state();
        assert_eq!(state.green_offset, 3);
        assert_eq!(state.blue_offset, 3);

        let input = GameInput {
            speed_down: held(),
            strafe_right: held(),
            ..GameInput::default()
        };
        for _ in 0..5 {
            update_game(&mut memory, &input);
        }
        let state = memory.game_state();
        assert_eq!(state.green_offset, -2);
        assert_eq!(state.blue_offset, -2);
    }

    #[test]
    fn opposing_buttons_cancel() {
        let mut memory = memory();
        let input = GameInput {
            speed_up: held(),
            speed_down: held(),
            strafe_left: held(),
            strafe_right: held(),
        };
        update_game(&mut memory, &input);
        let state = memory.game_state();
        assert_eq!((state.blue_offset, state.green_offset), (0, 0));
    }

    #[test]
    fn no_input_ticks_leave_offsets_unchanged() {
        let mut memory = memory();
        memory.initialize_if_needed();
        memory.with_game_state(|state| {
            state.blue_offset = 17;
            state.green_offset = -4;
        });
        for _ in 0..1000 {
            update_game(&mut memory, &GameInput::default());
        }
        let state = memory.game_state();
        assert_eq!((state.blue_offset, state.green_offset), (17, -4));
    }

    #[test]
    fn offsets_wrap_instead_of_overflowing() {
        let mut memory = memory();
        memory.initialize_if_needed();
        memory.with_game_state(|state| state.green_offset = i32::MAX);
        let input = GameInput {
            speed_up: held(),
            ..GameInput::default()
        };
        update_game(&mut memory, &input);
        assert_eq!(memory.game_state().green_offset, i32::MIN);
    }

    #[test]
    fn gradient_golden_4x4() {
        let state = GameState {
            blue_offset: 0,
            green_offset: 0,
            tone_hz: 256,
        };
        let mut buffer = OffscreenBuffer::new(4, 4);
        render_weird_gradient(&state, &mut buffer);

        let mut expected = Vec::new();
        for y in 0u8..4 {
            for x in 0u8..4 {
                expected.extend_from_slice(&[x, y, 0, 0]);
            }
        }
        assert_eq!(buffer.memory, expected);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buffer.pixel(x, y), ((y as u32) << 8) | x as u32);
            }
        }
    }

    #[test]
    fn blue_offset_wraps_mod_256() {
        let mut a = OffscreenBuffer::new(300, 2);
        let mut b = OffscreenBuffer::new(300, 2);
        let base = GameState {
            blue_offset: 300,
            green_offset: 5,
            tone_hz: 256,
        };
        render_weird_gradient(&base, &mut a);
        render_weird_gradient(
            &GameState {
                blue_offset: 44,
                ..base
            },
            &mut b,
        );
        assert_eq!(a.memory, b.memory);
    }

    #[test]
    fn negative_offsets_truncate() {
        let state = GameState {
            blue_offset: -1,
            green_offset: -1,
            tone_hz: 256,
        };
        let mut buffer = OffscreenBuffer::new(1, 1);
        render_weird_gradient(&state, &mut buffer);
        assert_eq!(buffer.pixel(0, 0), 0xFFFF);
    }

    #[test]
    fn gradient_leaves_row_padding_alone() {
        let state = GameState::default();
        let mut buffer = OffscreenBuffer::with_pitch(2, 2, 12);
        buffer.memory.fill(0xAA);
        render_weird_gradient(&state, &mut buffer);
        assert_eq!(&buffer.memory[8..12], &[0xAA; 4]);
        assert_eq!(&buffer.memory[20..24], &[0xAA; 4]);
        assert_eq!(buffer.pixel(1, 1), 0x0101);
    }

    #[test]
    fn sine_phase_wraps_to_one() {
        let state = GameState {
            blue_offset: 0,
            green_offset: 0,
            tone_hz: 256,
        };
        let mut sound = SoundBuffer::new(44100, true);
        assert_eq!(44100 / state.tone_hz, 172);
        sound.samples_needed = 172;
        output_sine(&state, &mut sound);
        assert_eq!(sound.t, 1);

        sound.samples_needed = 171;
        output_sine(&state, &mut sound);
        assert_eq!(sound.t, 172);
        sound.samples_needed = 1;
        output_sine(&state, &mut sound);
        assert_eq!(sound.t, 1);
    }

    #[test]
    fn sine_samples_are_duplicated_and_rounded() {
        let state = GameState {
            blue_offset: 0,
            green_offset: 0,
            tone_hz: 256,
        };
        let mut sound = SoundBuffer::new(44100, true);
        sound.t = 43;
        sound.samples_needed = 2;
        output_sine(&state, &mut sound);

        let expected = |t: f32| ((TAU * t / 172.0).sin() * TONE_VOLUME).round() as i16;
        assert_eq!(read_frame(&sound, 0), (expected(43.0), expected(43.0)));
        assert_eq!(read_frame(&sound, 1), (expected(44.0), expected(44.0)));
        // A quarter period in, the tone is at full volume.
        assert!(read_frame(&sound, 0).0 > 5990);
    }

    #[test]
    fn sine_never_writes_past_request() {
        let state = GameState {
            blue_offset: 0,
            green_offset: 0,
            tone_hz: 256,
        };
        let mut sound = SoundBuffer::new(44100, true);
        sound.memory.fill(0x55);
        sound.t = 10;
        sound.samples_needed = 3;
        output_sine(&state, &mut sound);
        assert!(sound.memory[12..].iter().all(|&b| b == 0x55));
    }

    #[test]
    fn tone_above_sample_rate_holds_phase_at_one() {
        let state = GameState {
            blue_offset: 0,
            green_offset: 0,
            tone_hz: 256,
        };
        let mut sound = SoundBuffer::new(100, true);
        sound.samples_needed = 4;
        output_sine(&state, &mut sound);
        assert_eq!(sound.t, 1);
    }

    #[test]
    fn fill_skips_disabled_audio() {
        let mut memory = memory();
        let mut offscreen = OffscreenBuffer::new(4, 4);
        let mut sound = SoundBuffer::new(44100, true);
        sound.enabled = false;
        sound.memory.fill(0xEE);
        sound.samples_needed = 100;
        let t_before = sound.t;

        fill_buffers(&mut memory, &mut offscreen, &mut sound);

        assert!(sound.memory.iter().all(|&b| b == 0xEE));
        assert_eq!(sound.t, t_before);
        assert_eq!(offscreen.pixel(3, 2), (2 << 8) | 3);
    }

    #[test]
    fn fill_before_any_update_uses_initialized_tone() {
        let mut memory = memory();
        let mut offscreen = OffscreenBuffer::new(1, 1);
        let mut sound = SoundBuffer::new(44100, true);
        sound.samples_needed = 200;
        fill_buffers(&mut memory, &mut offscreen, &mut sound);
        assert!(memory.is_initialized());
        // 1 + 200 passes the 172-sample period once.
        assert_eq!(sound.t, 1 + 200 - 172);
    }

    #[test]
    fn fill_after_zeroed_restore_plays_default_tone() {
        let mut memory = memory();
        memory.restore_permanent(&[0u8; 64]).expect("restore");
        let mut offscreen = OffscreenBuffer::new(1, 1);
        let mut sound = SoundBuffer::new(44100, true);
        sound.samples_needed = 10;
        fill_buffers(&mut memory, &mut offscreen, &mut sound);
        assert_eq!(sound.t, 11);

        sound.samples_needed = 190;
        fill_buffers(&mut memory, &mut offscreen, &mut sound);
        assert_eq!(sound.t, 1 + 200 - 172);
    }

    #[test]
    fn zero_tone_is_clamped_instead_of_dividing_by_zero() {
        let state = GameState::default();
        let mut sound = SoundBuffer::new(44100, true);
        sound.samples_needed = 10;
        output_sine(&state, &mut sound);
        // Period is the full sample rate, so the phase just advances.
        assert_eq!(sound.t, 11);
        assert!(read_frame(&sound, 0).0.abs() <= 1);
    }
}
