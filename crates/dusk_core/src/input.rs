//! Input state tracking with both edge-triggered and level-triggered queries,
//! and the per-tick intent snapshot the simulation consumes.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   down. Movement reads this.
//! - **Edge-triggered (just_pressed):** true only during the frame the key went
//!   down. Cleared by `end_frame()`, which the frame loop calls only after at
//!   least one fixed simulation step has consumed it, so a press is never lost
//!   on a frame that ran zero steps. Jump, attack and heal read this.
//!
//! The simulation never sees keys. It receives an `InputSnapshot` of boolean
//! intents, built here by the default keymap or by a scripted controller.

use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    W,
    A,
    S,
    D,
    J,
    K,
    F,
    R,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::Space,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::J,
        Key::K,
        Key::F,
        Key::R,
    ];

    /// Lowercase name used by replay files and script lookup tables.
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::Space => "space",
            Self::W => "w",
            Self::A => "a",
            Self::S => "s",
            Self::D => "d",
            Self::J => "j",
            Self::K => "k",
            Self::F => "f",
            Self::R => "r",
        }
    }
}

/// Boolean intents sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub heal: bool,
    pub attack: bool,
}

impl InputSnapshot {
    /// Horizontal direction in {-1, 0, 1}; opposing keys cancel.
    pub fn move_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.move_left {
            axis -= 1.0;
        }
        if self.move_right {
            axis += 1.0;
        }
        axis
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Replace the held set wholesale, generating press/release edges for the
    /// keys that changed.
    pub fn set_held(&mut self, keys: &[Key]) {
        let released: Vec<Key> = self
            .held
            .iter()
            .copied()
            .filter(|key| !keys.contains(key))
            .collect();
        for key in released {
            self.key_up(key);
        }
        for &key in keys {
            self.key_down(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Take a pending press of `key`, so later steps and frames no longer see it.
    pub fn consume_press(&mut self, key: Key) -> bool {
        self.just_pressed.remove(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn held_names(&self) -> Vec<&'static str> {
        Key::ALL
            .iter()
            .filter(|key| self.is_held(**key))
            .map(|key| key.name())
            .collect()
    }

    pub fn just_pressed_names(&self) -> Vec<&'static str> {
        Key::ALL
            .iter()
            .filter(|key| self.is_just_pressed(**key))
            .map(|key| key.name())
            .collect()
    }

    /// Default keymap: A/D or arrows move, Space/W/Up jump, J attacks, K or F heals.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            move_left: self.is_held(Key::Left) || self.is_held(Key::A),
            move_right: self.is_held(Key::Right) || self.is_held(Key::D),
            jump: self.is_just_pressed(Key::Space)
                || self.is_just_pressed(Key::W)
                || self.is_just_pressed(Key::Up),
            heal: self.is_just_pressed(Key::K) || self.is_just_pressed(Key::F),
            attack: self.is_just_pressed(Key::J),
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
