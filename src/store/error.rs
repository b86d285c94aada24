//! Errors for room graph operations.

use thiserror::Error;

use crate::model::{HotspotId, PuzzleId, ValidationError};

/// Errors that can occur when mutating the puzzle/hotspot stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Puzzle draft failed validation; nothing was changed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Hotspot id is not in the store
    #[error("Unknown hotspot: {0}")]
    UnknownHotspot(HotspotId),

    /// Puzzle id is not in the store
    #[error("Unknown puzzle: {0}")]
    UnknownPuzzle(PuzzleId),
}
