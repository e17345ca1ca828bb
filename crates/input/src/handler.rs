//! Held-key tracking for terminal environments.
//!
//! Builds one [`InputFrame`] per tick: movement and soft drop are levels,
//! rotate and hold are edges consumed by the frame that reports them.
//! Supports terminals that do not emit key release events by using a timeout.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};

use crate::map::{binding_for, handle_key_event, Binding};
use crate::types::InputFrame;

/// Horizontal key currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalDirection {
    Left,
    Right,
    None,
}

// Terminals without release events repeat presses while a key is held; a
// missing repeat within this window counts as a release.
const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u64 = 150;

#[derive(Debug, Clone)]
pub struct InputState {
    horizontal: HorizontalDirection,
    down_held: bool,
    rotate_pressed: bool,
    hold_pressed: bool,
    last_key_time: Instant,
    key_release_timeout: Duration,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            horizontal: HorizontalDirection::None,
            down_held: false,
            rotate_pressed: false,
            hold_pressed: false,
            last_key_time: Instant::now(),
            key_release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_TIMEOUT_MS),
        }
    }

    pub fn with_key_release_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.key_release_timeout = Duration::from_millis(timeout_ms);
        self
    }

    pub fn key_release_timeout(&self) -> Duration {
        self.key_release_timeout
    }

    pub fn horizontal(&self) -> HorizontalDirection {
        self.horizontal
    }

    /// Record a press (or an auto-repeat). Returns the binding it mapped to;
    /// Ctrl-modified keys map to nothing.
    pub fn handle_key_press(&mut self, key: KeyEvent) -> Option<Binding> {
        let binding = handle_key_event(key)?;
        match binding {
            Binding::MoveLeft => {
                self.last_key_time = Instant::now();
                self.horizontal = HorizontalDirection::Left;
            }
            Binding::MoveRight => {
                self.last_key_time = Instant::now();
                self.horizontal = HorizontalDirection::Right;
            }
            Binding::SoftDrop => {
                self.last_key_time = Instant::now();
                self.down_held = true;
            }
            Binding::Rotate => self.rotate_pressed = true,
            Binding::Hold => self.hold_pressed = true,
            Binding::Restart => {}
        }
        Some(binding)
    }

    pub fn handle_key_release(&mut self, code: KeyCode) {
        match binding_for(code) {
            Some(Binding::MoveLeft) if self.horizontal == HorizontalDirection::Left => {
                self.horizontal = HorizontalDirection::None;
            }
            Some(Binding::MoveRight) if self.horizontal == HorizontalDirection::Right => {
                self.horizontal = HorizontalDirection::None;
            }
            Some(Binding::SoftDrop) => self.down_held = false,
            _ => {}
        }
    }

    /// Sample the input for this tick, consuming pending edges.
    pub fn frame(&mut self) -> InputFrame {
        self.frame_at(Instant::now())
    }

    fn frame_at(&mut self, now: Instant) -> InputFrame {
        // Auto-release when terminal does not emit release events.
        if now.saturating_duration_since(self.last_key_time) > self.key_release_timeout {
            self.horizontal = HorizontalDirection::None;
            self.down_held = false;
        }

        let frame = InputFrame {
            left: self.horizontal == HorizontalDirection::Left,
            right: self.horizontal == HorizontalDirection::Right,
            soft_drop: self.down_held,
            rotate: self.rotate_pressed,
            hold: self.hold_pressed,
        };
        self.rotate_pressed = false;
        self.hold_pressed = false;
        frame
    }

    pub fn reset(&mut self) {
        self.horizontal = HorizontalDirection::None;
        self.down_held = false;
        self.rotate_pressed = false;
        self.hold_pressed = false;
        self.last_key_time = Instant::now();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
