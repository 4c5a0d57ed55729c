//! Recorded input, one entry per fixed tick, stored as JSON.
//!
//! Consecutive identical ticks are run-length encoded through `repeat`:
//!
//! ```json
//! { "tick_seconds": 0.033333335,
//!   "frames": [ { "speed_up": true, "repeat": 30 }, { "strafe_right": true } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::CoreError;
use crate::input::{ButtonState, GameInput};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySequence {
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFrame {
    #[serde(default)]
    pub speed_up: bool,
    #[serde(default)]
    pub speed_down: bool,
    #[serde(default)]
    pub strafe_left: bool,
    #[serde(default)]
    pub strafe_right: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplayFrame {
    fn from_input(input: &GameInput) -> Self {
        Self {
            speed_up: input.speed_up.ended_down,
            speed_down: input.speed_down.ended_down,
            strafe_left: input.strafe_left.ended_down,
            strafe_right: input.strafe_right.ended_down,
            repeat: 1,
        }
    }

    fn same_buttons(&self, other: &ReplayFrame) -> bool {
        self.speed_up == other.speed_up
            && self.speed_down == other.speed_down
            && self.strafe_left == other.strafe_left
            && self.strafe_right == other.strafe_right
    }
}

impl ReplaySequence {
    pub fn new(tick_seconds: f32) -> Self {
        Self {
            tick_seconds,
            frames: Vec::new(),
        }
    }

    /// Append one tick of input, merging it into the last frame when the
    /// held buttons are unchanged.
    pub fn record(&mut self, input: &GameInput) {
        let frame = ReplayFrame::from_input(input);
        match self.frames.last_mut() {
            Some(last) if last.same_buttons(&frame) => last.repeat += 1,
            _ => self.frames.push(frame),
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat.max(1))).sum()
    }
}

fn button(previous: ButtonState, ended_down: bool) -> ButtonState {
    ButtonState {
        half_transition_count: i32::from(previous.ended_down != ended_down),
        ended_down,
    }
}

/// Feeds recorded inputs to the driver one tick at a time.
///
/// Frames are stepped through in place; a `repeat` run is never expanded
/// into memory. Transition counts are reconstructed from changes in the
/// held state between ticks.
pub struct ReplayPlayback {
    frames: Vec<ReplayFrame>,
    frame_index: usize,
    ticks_left_in_frame: u32,
    previous: GameInput,
}

impl ReplayPlayback {
    pub fn new(replay: &ReplaySequence) -> Self {
        let ticks_left_in_frame = replay.frames.first().map_or(0, |f| f.repeat.max(1));
        Self {
            frames: replay.frames.clone(),
            frame_index: 0,
            ticks_left_in_frame,
            previous: GameInput::default(),
        }
    }

    pub fn next_input(&mut self) -> Option<GameInput> {
        let frame = *self.frames.get(self.frame_index)?;
        let input = GameInput {
            speed_up: button(self.previous.speed_up, frame.speed_up),
            speed_down: button(self.previous.speed_down, frame.speed_down),
            strafe_left: button(self.previous.strafe_left, frame.strafe_left),
            strafe_right: button(self.previous.strafe_right, frame.strafe_right),
        };
        self.previous = input;

        self.ticks_left_in_frame -= 1;
        if self.ticks_left_in_frame == 0 {
            self.frame_index += 1;
            self.ticks_left_in_frame = self
                .frames
                .get(self.frame_index)
                .map_or(0, |f| f.repeat.max(1));
        }
        Some(input)
    }

    pub fn is_finished(&self) -> bool {
        self.frame_index >= self.frames.len()
    }
}

impl Iterator for ReplayPlayback {
    type Item = GameInput;

    fn next(&mut self) -> Option<GameInput> {
        self.next_input()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, CoreError> {
    let raw = fs::read_to_string(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let replay: ReplaySequence = serde_json::from_str(&raw).map_err(|source| CoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_replay(&replay)?;
    Ok(replay)
}

pub fn save_replay_to_path(path: &Path, replay: &ReplaySequence) -> Result<(), CoreError> {
    let json = serde_json::to_string_pretty(replay).map_err(|source| CoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| CoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), CoreError> {
    if !(replay.tick_seconds > 0.0) {
        return Err(CoreError::Validation {
            what: "replay",
            reason: "tick_seconds must be > 0".to_string(),
        });
    }
    if replay.frames.is_empty() {
        return Err(CoreError::Validation {
            what: "replay",
            reason: "frames list is empty".to_string(),
        });
    }
    Ok(())
}

fn default_tick_seconds() -> f32 {
    1.0 / 30.0
}

const fn default_repeat() -> u32 {
    1
}
