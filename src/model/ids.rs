//! Identifier newtypes for puzzles and hotspots.
//!
//! Ids are opaque strings: locally generated ids are UUIDs, ids that came
//! back from the server are whatever the database assigned.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a string-backed identifier type.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh local id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Puzzle`](super::Puzzle).
    PuzzleId
);

string_id!(
    /// Identifier of a [`Hotspot`](super::Hotspot).
    HotspotId
);
