//! Room-wide settings.

use crate::constants::{DEFAULT_GLOBAL_MINUTES, DEFAULT_ROOM_NAME};

/// Settings edited in the builder form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Room name, used to derive the slug on first save.
    pub name: String,
    /// Play-mode countdown in minutes. Always positive.
    pub global_minutes: u32,
    /// Background image as a data URL.
    pub background_image: Option<String>,
    /// Server id of the room; `None` until the first successful save.
    pub room_id: Option<String>,
}

impl Settings {
    /// Countdown length in seconds.
    pub fn timer_seconds(&self) -> u32 {
        self.global_minutes.saturating_mul(60)
    }

    pub fn is_saved(&self) -> bool {
        self.room_id.is_some()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: DEFAULT_ROOM_NAME.to_string(),
            global_minutes: DEFAULT_GLOBAL_MINUTES,
            background_image: None,
            room_id: None,
        }
    }
}
