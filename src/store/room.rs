//! The room graph: settings plus puzzles and the hotspots that point at them.

use crate::model::{Hotspot, HotspotId, Puzzle, PuzzleId, Settings};

use super::{HotspotStore, PuzzleStore, StoreError};

/// Everything the author edits in one builder session.
///
/// Operations that touch both stores live here so links never dangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room {
    pub settings: Settings,
    pub puzzles: PuzzleStore,
    pub hotspots: HotspotStore,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a hotspot to an existing puzzle.
    pub fn link_hotspot(
        &mut self,
        hotspot_id: &HotspotId,
        puzzle_id: &PuzzleId,
    ) -> Result<(), StoreError> {
        if !self.puzzles.contains(puzzle_id) {
            return Err(StoreError::UnknownPuzzle(puzzle_id.clone()));
        }
        self.hotspots
            .set_link(hotspot_id, Some(puzzle_id.clone()))?;
        log::debug!("Linked hotspot {} -> puzzle {}", hotspot_id, puzzle_id);
        Ok(())
    }

    /// Remove a hotspot's link, keeping the hotspot.
    pub fn unlink_hotspot(&mut self, hotspot_id: &HotspotId) -> Result<(), StoreError> {
        self.hotspots.set_link(hotspot_id, None)
    }

    /// Delete a hotspot. Its puzzle is left alone.
    pub fn delete_hotspot(&mut self, hotspot_id: &HotspotId) -> Result<Hotspot, StoreError> {
        self.hotspots
            .remove(hotspot_id)
            .ok_or_else(|| StoreError::UnknownHotspot(hotspot_id.clone()))
    }

    /// Delete a puzzle after detaching every hotspot that referenced it.
    pub fn delete_puzzle(&mut self, puzzle_id: &PuzzleId) -> Result<Puzzle, StoreError> {
        if !self.puzzles.contains(puzzle_id) {
            return Err(StoreError::UnknownPuzzle(puzzle_id.clone()));
        }
        let detached = self.hotspots.detach_puzzle(puzzle_id);
        let puzzle = self
            .puzzles
            .remove(puzzle_id)
            .ok_or_else(|| StoreError::UnknownPuzzle(puzzle_id.clone()))?;
        log::debug!(
            "Deleted puzzle {} ({} hotspots detached)",
            puzzle_id,
            detached
        );
        Ok(puzzle)
    }

    /// Puzzle linked from a hotspot, if both exist.
    pub fn puzzle_for(&self, hotspot_id: &HotspotId) -> Option<&Puzzle> {
        let puzzle_id = self.hotspots.get(hotspot_id)?.puzzle_id.as_ref()?;
        self.puzzles.get(puzzle_id)
    }

    /// Hotspots whose link points at a puzzle that is not in the store.
    /// Always empty unless an invariant was broken.
    pub fn dangling_links(&self) -> Vec<HotspotId> {
        self.hotspots
            .iter()
            .filter(|h| {
                h.puzzle_id
                    .as_ref()
                    .is_some_and(|pid| !self.puzzles.contains(pid))
            })
            .map(|h| h.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Pct;
    use crate::model::PuzzleDraft;

    fn room_with_puzzle() -> (Room, PuzzleId) {
        let mut room = Room::new();
        let pid = room
            .puzzles
            .create_or_update(PuzzleDraft::short("Year?", "1985"))
            .unwrap();
        (room, pid)
    }

    #[test]
    fn test_link_requires_existing_puzzle() {
        let (mut room, pid) = room_with_puzzle();
        let hid = room.hotspots.create(Pct::new(10.0, 10.0));

        room.link_hotspot(&hid, &pid).unwrap();
        assert_eq!(room.puzzle_for(&hid).unwrap().id, pid);

        let err = room
            .link_hotspot(&hid, &PuzzleId::new("ghost"))
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownPuzzle(PuzzleId::new("ghost")));
        // Failed link leaves the previous one in place
        assert_eq!(room.puzzle_for(&hid).unwrap().id, pid);
    }

    #[test]
    fn test_link_unknown_hotspot_fails() {
        let (mut room, pid) = room_with_puzzle();
        let err = room
            .link_hotspot(&HotspotId::new("ghost"), &pid)
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownHotspot(HotspotId::new("ghost")));
    }

    #[test]
    fn test_delete_puzzle_detaches_all_hotspots() {
        let (mut room, pid) = room_with_puzzle();
        let ids: Vec<_> = (0..3)
            .map(|i| room.hotspots.create(Pct::new(i as f64 * 10.0, 50.0)))
            .collect();
        for id in &ids {
            room.link_hotspot(id, &pid).unwrap();
        }

        room.delete_puzzle(&pid).unwrap();

        assert!(room.puzzles.is_empty());
        assert_eq!(room.hotspots.len(), 3);
        for id in &ids {
            assert!(room.hotspots.get(id).unwrap().puzzle_id.is_none());
        }
        assert!(room.dangling_links().is_empty());
    }

    #[test]
    fn test_delete_hotspot_keeps_puzzle() {
        let (mut room, pid) = room_with_puzzle();
        let hid = room.hotspots.create(Pct::new(10.0, 10.0));
        room.link_hotspot(&hid, &pid).unwrap();

        room.delete_hotspot(&hid).unwrap();

        assert!(room.hotspots.is_empty());
        assert!(room.puzzles.contains(&pid));
        assert!(room.delete_hotspot(&hid).is_err());
    }
}
