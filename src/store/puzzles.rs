//! Ordered puzzle collection.

use crate::model::{Puzzle, PuzzleDraft, PuzzleId};

use super::StoreError;

/// Puzzles in author order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PuzzleStore {
    puzzles: Vec<Puzzle>,
}

impl PuzzleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-validated puzzles (e.g. after a load).
    pub fn from_puzzles(puzzles: Vec<Puzzle>) -> Self {
        Self { puzzles }
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Puzzle> {
        self.puzzles.iter()
    }

    pub fn get(&self, id: &PuzzleId) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PuzzleId) -> bool {
        self.get(id).is_some()
    }

    /// Validate a draft and store it.
    ///
    /// A draft without an id is appended under a fresh id. A draft bound to
    /// an id replaces that puzzle in place, keeping its position. On error
    /// the store is unchanged.
    pub fn create_or_update(&mut self, draft: PuzzleDraft) -> Result<PuzzleId, StoreError> {
        match draft.id.clone() {
            Some(id) => {
                let index = self
                    .puzzles
                    .iter()
                    .position(|p| p.id == id)
                    .ok_or_else(|| StoreError::UnknownPuzzle(id.clone()))?;
                let puzzle = draft.validate(id.clone())?;
                self.puzzles[index] = puzzle;
                log::debug!("Updated puzzle {} at position {}", id, index);
                Ok(id)
            }
            None => {
                let id = PuzzleId::generate();
                let puzzle = draft.validate(id.clone())?;
                self.puzzles.push(puzzle);
                log::debug!("Created puzzle {} ({} total)", id, self.puzzles.len());
                Ok(id)
            }
        }
    }

    /// Remove a puzzle. Callers must detach hotspots first; see
    /// [`Room::delete_puzzle`](super::Room::delete_puzzle).
    pub(super) fn remove(&mut self, id: &PuzzleId) -> Option<Puzzle> {
        let index = self.puzzles.iter().position(|p| &p.id == id)?;
        Some(self.puzzles.remove(index))
    }
}
