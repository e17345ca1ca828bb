//! Key mapping from terminal events to game bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key does in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Hold,
    Restart,
}

/// Map a key code to its binding.
pub fn binding_for(code: KeyCode) -> Option<Binding> {
    match code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(Binding::MoveLeft)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(Binding::MoveRight)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(Binding::SoftDrop)
        }

        KeyCode::Up
        | KeyCode::Char(' ')
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W') => Some(Binding::Rotate),

        KeyCode::Char('c') | KeyCode::Char('C') => Some(Binding::Hold),

        KeyCode::Char('r') | KeyCode::Char('R') => Some(Binding::Restart),

        _ => None,
    }
}

/// Map a keyboard event to its binding.
pub fn handle_key_event(key: KeyEvent) -> Option<Binding> {
    // Ctrl+C is quit, not hold
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    binding_for(key.code)
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
