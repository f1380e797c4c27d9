//! Input sampling.
//!
//! Maintains the set of currently held logical keys, fed by raw
//! key-down/key-up events from whatever windowing layer hosts the game.
//! Key-down is only honored while input capture is active (pointer lock or
//! focus); key-up is always honored, so a key cannot stay stuck "held"
//! after capture is lost mid-press.

use std::collections::HashSet;

/// Logical key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Shift,
    Fire,
    Debug,
}

/// Discrete movement intent derived from the held-key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    /// -1 back, 0 idle, 1 forward.
    pub forward: i32,
    /// -1 left, 0 straight, 1 right.
    pub right: i32,
    pub shift_held: bool,
}

#[derive(Default)]
pub struct InputSampler {
    held: HashSet<Key>,
    capture_active: bool,
    fire_edges: u32,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer-lock / focus state. Presses are ignored while inactive.
    pub fn set_capture(&mut self, active: bool) {
        self.capture_active = active;
    }

    pub fn capture_active(&self) -> bool {
        self.capture_active
    }

    pub fn key_down(&mut self, key: Key) {
        if !self.capture_active {
            return;
        }
        if key == Key::Fire && !self.held.contains(&Key::Fire) {
            self.fire_edges += 1;
        }
        self.held.insert(key);
    }

    /// Releases are honored regardless of capture state.
    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Current discrete intent. When left and right are both held, right
    /// wins.
    pub fn intent(&self) -> Intent {
        let mut forward = 0;
        let mut right = 0;

        if self.held.contains(&Key::Forward) {
            forward += 1;
        }
        if self.held.contains(&Key::Back) {
            forward -= 1;
        }
        if self.held.contains(&Key::Left) {
            right -= 1;
        }
        if self.held.contains(&Key::Right) {
            right = 1;
        }

        Intent {
            forward,
            right,
            shift_held: self.held.contains(&Key::Shift),
        }
    }

    /// Drains fire key-down edges accumulated since the last call.
    pub fn take_fire_edges(&mut self) -> u32 {
        std::mem::take(&mut self.fire_edges)
    }
}
