//! Global constants for the escape room builder

use std::time::Duration;

/// Timer length for new rooms, in minutes
pub const DEFAULT_GLOBAL_MINUTES: u32 = 5;

/// Name used for rooms the author has not named yet
pub const DEFAULT_ROOM_NAME: &str = "Untitled Room";

/// Play-mode timer period
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Delay between a resize/image change and re-measuring the container
pub const DEFAULT_LAYOUT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Hit-area width/height (percent) stored with every persisted hotspot
pub const HOTSPOT_HIT_SIZE: f64 = 6.0;

/// Number of timestamp digits appended to a room slug
pub const SLUG_SUFFIX_DIGITS: usize = 4;

/// Pointer travel (container percent) after which a press becomes a drag
pub const MIN_DRAG_DISTANCE: f64 = 0.5;
