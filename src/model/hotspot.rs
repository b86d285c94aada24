//! Hotspot data model.

use crate::geometry::Pct;

use super::{HotspotId, PuzzleId};

/// A clickable point on the background image.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    /// Unique identifier.
    pub id: HotspotId,
    /// Linked puzzle, if any. The hotspot does not own it.
    pub puzzle_id: Option<PuzzleId>,
    /// Position in percent of the rendered image content, each axis in `[0, 100]`.
    pub position: Pct,
}

impl Hotspot {
    /// Create an unlinked hotspot at a (clamped) image position.
    pub fn new(id: HotspotId, position: Pct) -> Self {
        Self {
            id,
            puzzle_id: None,
            position: position.clamped(),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.puzzle_id.is_some()
    }
}
