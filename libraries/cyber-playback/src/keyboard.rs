//! Keyboard shortcuts

use crate::events::Action;

/// Seek step for the arrow keys, in seconds
pub const SEEK_STEP_SECONDS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Parse a typed token such as `space` or `left`
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "space" => Some(Self::Space),
            "left" | "arrowleft" => Some(Self::ArrowLeft),
            "right" | "arrowright" => Some(Self::ArrowRight),
            _ => None,
        }
    }
}

/// Map a key to the action it triggers
pub fn action_for(key: Key) -> Action {
    match key {
        Key::Space => Action::TogglePlay,
        Key::ArrowLeft => Action::SeekBy(-SEEK_STEP_SECONDS),
        Key::ArrowRight => Action::SeekBy(SEEK_STEP_SECONDS),
    }
}
