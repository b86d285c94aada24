//! Ordered hotspot collection.

use crate::geometry::Pct;
use crate::model::{Hotspot, HotspotId, PuzzleId};

use super::StoreError;

/// Hotspots in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotStore {
    hotspots: Vec<Hotspot>,
}

impl HotspotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing hotspots (e.g. after a load).
    pub fn from_hotspots(hotspots: Vec<Hotspot>) -> Self {
        Self { hotspots }
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hotspot> {
        self.hotspots.iter()
    }

    pub fn get(&self, id: &HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| &h.id == id)
    }

    pub fn contains(&self, id: &HotspotId) -> bool {
        self.get(id).is_some()
    }

    /// Index of a hotspot in display order.
    pub fn index_of(&self, id: &HotspotId) -> Option<usize> {
        self.hotspots.iter().position(|h| &h.id == id)
    }

    /// Append an unlinked hotspot at an image position and return its id.
    pub fn create(&mut self, position: Pct) -> HotspotId {
        let id = HotspotId::generate();
        self.hotspots.push(Hotspot::new(id.clone(), position));
        log::debug!(
            "Created hotspot {} at ({:.1}%, {:.1}%)",
            id,
            position.x,
            position.y
        );
        id
    }

    /// Move a hotspot, clamping to the image. Unknown ids are ignored.
    pub fn move_to(&mut self, id: &HotspotId, position: Pct) -> bool {
        match self.hotspots.iter_mut().find(|h| &h.id == id) {
            Some(hotspot) => {
                hotspot.position = position.clamped();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &HotspotId) -> Option<Hotspot> {
        let index = self.index_of(id)?;
        let removed = self.hotspots.remove(index);
        log::debug!("Removed hotspot {}", id);
        Some(removed)
    }

    /// Overwrite a hotspot's puzzle link without checking the puzzle.
    /// Use [`Room::link_hotspot`](super::Room::link_hotspot) for a checked link.
    pub(super) fn set_link(
        &mut self,
        id: &HotspotId,
        puzzle_id: Option<PuzzleId>,
    ) -> Result<(), StoreError> {
        let hotspot = self
            .hotspots
            .iter_mut()
            .find(|h| &h.id == id)
            .ok_or_else(|| StoreError::UnknownHotspot(id.clone()))?;
        hotspot.puzzle_id = puzzle_id;
        Ok(())
    }

    /// Null out every link to `puzzle_id`, returning how many were cleared.
    pub fn detach_puzzle(&mut self, puzzle_id: &PuzzleId) -> usize {
        let mut detached = 0;
        for hotspot in &mut self.hotspots {
            if hotspot.puzzle_id.as_ref() == Some(puzzle_id) {
                hotspot.puzzle_id = None;
                detached += 1;
            }
        }
        detached
    }

    /// Number of hotspots that have a puzzle.
    pub fn linked_count(&self) -> usize {
        self.hotspots.iter().filter(|h| h.is_linked()).count()
    }
}
