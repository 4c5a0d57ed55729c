//! Keyboard state and its translation into the simulation's button model.
//!
//! The platform shell feeds raw `key_down` / `key_up` events. Keys bound to a
//! logical `Action` update the matching `ButtonState` in `GameInput`, which is
//! the only input the simulation ever reads:
//!
//! - `ended_down` is level-triggered: true for as long as the key is held.
//! - `half_transition_count` counts up/down edges since the counters were last
//!   cleared by `consume_transitions()`. The driver clears them only after at
//!   least one tick has seen them, so a tap on a zero-tick frame is not lost.
//!
//! Keys without an action (overlay toggle, snapshot save/load) are exposed
//! through `is_just_pressed` for the shell itself; those edges last exactly
//! one presented frame and are cleared by `end_frame()`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Escape,
    F3,
    F5,
    F9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SpeedUp,
    SpeedDown,
    StrafeLeft,
    StrafeRight,
}

impl Key {
    pub fn action(self) -> Option<Action> {
        match self {
            Key::W => Some(Action::SpeedUp),
            Key::S => Some(Action::SpeedDown),
            Key::A => Some(Action::StrafeLeft),
            Key::D => Some(Action::StrafeRight),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub half_transition_count: i32,
    pub ended_down: bool,
}

impl ButtonState {
    fn process(&mut self, is_down: bool) {
        if self.ended_down != is_down {
            self.ended_down = is_down;
            self.half_transition_count += 1;
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInput {
    pub speed_up: ButtonState,
    pub speed_down: ButtonState,
    pub strafe_left: ButtonState,
    pub strafe_right: ButtonState,
}

impl GameInput {
    pub fn button(&self, action: Action) -> &ButtonState {
        match action {
            Action::SpeedUp => &self.speed_up,
            Action::SpeedDown => &self.speed_down,
            Action::StrafeLeft => &self.strafe_left,
            Action::StrafeRight => &self.strafe_right,
        }
    }

    pub fn button_mut(&mut self, action: Action) -> &mut ButtonState {
        match action {
            Action::SpeedUp => &mut self.speed_up,
            Action::SpeedDown => &mut self.speed_down,
            Action::StrafeLeft => &mut self.strafe_left,
            Action::StrafeRight => &mut self.strafe_right,
        }
    }

    pub fn clear_transitions(&mut self) {
        for button in [
            &mut self.speed_up,
            &mut self.speed_down,
            &mut self.strafe_left,
            &mut self.strafe_right,
        ] {
            button.half_transition_count = 0;
        }
    }
}

pub struct InputState {
    game: GameInput,
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            game: GameInput::default(),
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            quit_requested: false,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if !self.held.insert(key) {
            return;
        }
        self.just_pressed.insert(key);
        if let Some(action) = key.action() {
            self.game.button_mut(action).process(true);
        }
        if key == Key::Escape {
            self.quit_requested = true;
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if !self.held.remove(&key) {
            return;
        }
        if let Some(action) = key.action() {
            self.game.button_mut(action).process(false);
        }
    }

    /// Window close or any other platform quit signal.
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn game(&self) -> &GameInput {
        &self.game
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn consume_transitions(&mut self) {
        self.game.clear_transitions();
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
