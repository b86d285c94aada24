//! Table storage and transactions.
//!
//! A transaction works on a copy of the tables and only replaces the live
//! tables (and the snapshot file, when one is configured) after the whole
//! closure succeeded. Readers never observe a half-applied transaction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::rows::{
    HotspotRow, NewHotspot, NewPuzzle, NewRoom, PUZZLE_KIND_MCQ, PUZZLE_KIND_SHORT, PuzzleRow,
    RoomRow, RoomUpdate, RoomWithChildren,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    rooms: Vec<RoomRow>,
    #[serde(default)]
    puzzles: Vec<PuzzleRow>,
    #[serde(default)]
    hotspots: Vec<HotspotRow>,
}

/// Fewest non-blank options a multiple-choice puzzle may have.
const MIN_MCQ_OPTIONS: usize = 2;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The room database.
#[derive(Debug, Default)]
pub struct Database {
    tables: Tables,
    snapshot_path: Option<PathBuf>,
}

impl Database {
    /// Create an empty database that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a database backed by a JSON snapshot file.
    ///
    /// A missing file yields an empty database; the file is created on the
    /// first commit.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            let tables: Tables = serde_json::from_str(&json)?;
            log::info!(
                "Opened room database {:?} ({} rooms, {} puzzles, {} hotspots)",
                path,
                tables.rooms.len(),
                tables.puzzles.len(),
                tables.hotspots.len()
            );
            tables
        } else {
            log::info!("Room database {:?} does not exist yet, starting empty", path);
            Tables::default()
        };

        Ok(Self {
            tables,
            snapshot_path: Some(path),
        })
    }

    /// Path of the snapshot file, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Run `f` atomically. Any error discards every change made by `f`.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<T>,
    {
        let mut working = self.tables.clone();
        let value = {
            let mut tx = Transaction {
                tables: &mut working,
            };
            match f(&mut tx) {
                Ok(value) => value,
                Err(e) => {
                    log::debug!("Transaction rolled back: {}", e);
                    return Err(e);
                }
            }
        };

        self.write_snapshot(&working)?;
        self.tables = working;
        Ok(value)
    }

    fn write_snapshot(&self, tables: &Tables) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(tables)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        log::trace!("Wrote room database snapshot to {:?}", path);
        Ok(())
    }

    /// Look up a room by id.
    pub fn find_room(&self, id: &str) -> Option<&RoomRow> {
        self.tables.rooms.iter().find(|r| r.id == id)
    }

    pub fn find_room_by_slug(&self, slug: &str) -> Option<&RoomRow> {
        self.tables.rooms.iter().find(|r| r.slug == slug)
    }

    /// Fetch a room with all of its puzzles and hotspots.
    pub fn room_with_children(&self, id: &str) -> Option<RoomWithChildren> {
        let room = self.find_room(id)?.clone();
        let puzzles = self
            .tables
            .puzzles
            .iter()
            .filter(|p| p.room_id == id)
            .cloned()
            .collect();
        let hotspots = self
            .tables
            .hotspots
            .iter()
            .filter(|h| h.room_id == id)
            .cloned()
            .collect();

        Some(RoomWithChildren {
            room,
            puzzles,
            hotspots,
        })
    }

    /// Delete a room together with all of its puzzles and hotspots.
    pub fn delete_room(&mut self, id: &str) -> Result<RoomRow> {
        self.transaction(|tx| tx.delete_room(id))
    }

    pub fn room_count(&self) -> usize {
        self.tables.rooms.len()
    }

    pub fn puzzle_count(&self, room_id: &str) -> usize {
        self.tables
            .puzzles
            .iter()
            .filter(|p| p.room_id == room_id)
            .count()
    }

    pub fn hotspot_count(&self, room_id: &str) -> usize {
        self.tables
            .hotspots
            .iter()
            .filter(|h| h.room_id == room_id)
            .count()
    }
}

/// Mutable view over the tables inside [`Database::transaction`].
pub struct Transaction<'a> {
    tables: &'a mut Tables,
}

impl Transaction<'_> {
    pub fn find_room(&self, id: &str) -> Option<&RoomRow> {
        self.tables.rooms.iter().find(|r| r.id == id)
    }

    pub fn find_room_by_slug(&self, slug: &str) -> Option<&RoomRow> {
        self.tables.rooms.iter().find(|r| r.slug == slug)
    }

    pub fn slug_exists(&self, slug: &str) -> bool {
        self.find_room_by_slug(slug).is_some()
    }

    pub fn create_room(&mut self, new: NewRoom) -> Result<RoomRow> {
        if new.global_minutes == 0 {
            return Err(DbError::check("room", "global_minutes must be positive"));
        }
        if self.slug_exists(&new.slug) {
            return Err(DbError::UniqueViolation {
                table: "room",
                column: "slug",
                value: new.slug,
            });
        }

        let row = RoomRow {
            id: new_id(),
            slug: new.slug,
            name: new.name,
            description: new.description,
            theme: new.theme,
            image_url: new.image_url,
            global_minutes: new.global_minutes,
        };
        self.tables.rooms.push(row.clone());
        Ok(row)
    }

    pub fn update_room(&mut self, id: &str, update: RoomUpdate) -> Result<RoomRow> {
        if update.global_minutes == 0 {
            return Err(DbError::check("room", "global_minutes must be positive"));
        }
        let row = self
            .tables
            .rooms
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DbError::RoomNotFound(id.to_string()))?;

        row.name = update.name;
        row.image_url = update.image_url;
        row.global_minutes = update.global_minutes;
        Ok(row.clone())
    }

    /// Delete every hotspot of a room, returning how many were removed.
    pub fn delete_hotspots(&mut self, room_id: &str) -> usize {
        let before = self.tables.hotspots.len();
        self.tables.hotspots.retain(|h| h.room_id != room_id);
        before - self.tables.hotspots.len()
    }

    /// Delete every puzzle of a room.
    ///
    /// Fails while any hotspot still references one of those puzzles, so
    /// hotspots have to go first.
    pub fn delete_puzzles(&mut self, room_id: &str) -> Result<usize> {
        let referenced = self.tables.hotspots.iter().find_map(|h| {
            let pid = h.puzzle_id.as_deref()?;
            self.tables
                .puzzles
                .iter()
                .any(|p| p.id == pid && p.room_id == room_id)
                .then(|| pid.to_string())
        });
        if let Some(value) = referenced {
            return Err(DbError::ForeignKey {
                table: "hotspot",
                column: "puzzle_id",
                value,
            });
        }

        let before = self.tables.puzzles.len();
        self.tables.puzzles.retain(|p| p.room_id != room_id);
        Ok(before - self.tables.puzzles.len())
    }

    pub fn create_puzzle(&mut self, new: NewPuzzle) -> Result<PuzzleRow> {
        if self.find_room(&new.room_id).is_none() {
            return Err(DbError::ForeignKey {
                table: "puzzle",
                column: "room_id",
                value: new.room_id,
            });
        }
        if new.question.trim().is_empty() {
            return Err(DbError::check("puzzle", "question must not be empty"));
        }
        match new.kind.as_str() {
            PUZZLE_KIND_MCQ => {
                let filled = new.options.iter().filter(|o| !o.trim().is_empty()).count();
                if filled < MIN_MCQ_OPTIONS {
                    return Err(DbError::check(
                        "puzzle",
                        format!("mcq puzzles need at least {} options", MIN_MCQ_OPTIONS),
                    ));
                }
                let in_range = new
                    .correct_index
                    .is_some_and(|i| (i as usize) < new.options.len());
                if !in_range {
                    return Err(DbError::check(
                        "puzzle",
                        format!(
                            "correct_index {:?} out of range for {} options",
                            new.correct_index,
                            new.options.len()
                        ),
                    ));
                }
            }
            PUZZLE_KIND_SHORT => {
                let blank = new
                    .expected_answer
                    .as_deref()
                    .map_or(true, |a| a.trim().is_empty());
                if blank {
                    return Err(DbError::check(
                        "puzzle",
                        "short puzzles need an expected_answer",
                    ));
                }
            }
            other => {
                return Err(DbError::check("puzzle", format!("unknown kind '{}'", other)));
            }
        }

        let row = PuzzleRow {
            id: new_id(),
            room_id: new.room_id,
            kind: new.kind,
            question: new.question,
            options: new.options,
            correct_index: new.correct_index,
            expected_answer: new.expected_answer,
            image_url: new.image_url,
            clue: new.clue,
        };
        self.tables.puzzles.push(row.clone());
        Ok(row)
    }

    pub fn create_hotspot(&mut self, new: NewHotspot) -> Result<HotspotRow> {
        if self.find_room(&new.room_id).is_none() {
            return Err(DbError::ForeignKey {
                table: "hotspot",
                column: "room_id",
                value: new.room_id,
            });
        }
        if let Some(pid) = &new.puzzle_id {
            let exists = self
                .tables
                .puzzles
                .iter()
                .any(|p| &p.id == pid && p.room_id == new.room_id);
            if !exists {
                return Err(DbError::ForeignKey {
                    table: "hotspot",
                    column: "puzzle_id",
                    value: pid.clone(),
                });
            }
        }
        if !new.x.is_finite() || !new.y.is_finite() {
            return Err(DbError::check("hotspot", "position must be finite"));
        }

        let row = HotspotRow {
            id: new_id(),
            room_id: new.room_id,
            puzzle_id: new.puzzle_id,
            x: new.x,
            y: new.y,
            width: new.width,
            height: new.height,
        };
        self.tables.hotspots.push(row.clone());
        Ok(row)
    }

    /// Delete a room and cascade to its children.
    pub fn delete_room(&mut self, id: &str) -> Result<RoomRow> {
        let index = self
            .tables
            .rooms
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DbError::RoomNotFound(id.to_string()))?;

        self.delete_hotspots(id);
        self.tables.puzzles.retain(|p| p.room_id != id);
        Ok(self.tables.rooms.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(slug: &str) -> NewRoom {
        NewRoom {
            slug: slug.to_string(),
            name: slug.to_string(),
            global_minutes: 10,
            ..Default::default()
        }
    }

    fn short_puzzle(room_id: &str, question: &str) -> NewPuzzle {
        NewPuzzle {
            room_id: room_id.to_string(),
            kind: PUZZLE_KIND_SHORT.to_string(),
            question: question.to_string(),
            expected_answer: Some("answer".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_room_with_children() {
        let mut db = Database::in_memory();
        let room_id = db
            .transaction(|tx| {
                let room = tx.create_room(room("office"))?;
                let puzzle = tx.create_puzzle(short_puzzle(&room.id, "Year?"))?;
                tx.create_hotspot(NewHotspot {
                    room_id: room.id.clone(),
                    puzzle_id: Some(puzzle.id),
                    x: 10.0,
                    y: 20.0,
                    width: 6.0,
                    height: 6.0,
                })?;
                Ok(room.id)
            })
            .unwrap();

        let loaded = db.room_with_children(&room_id).unwrap();
        assert_eq!(loaded.room.slug, "office");
        assert_eq!(loaded.puzzles.len(), 1);
        assert_eq!(loaded.hotspots.len(), 1);
        assert_eq!(
            loaded.hotspots[0].puzzle_id.as_deref(),
            Some(loaded.puzzles[0].id.as_str())
        );
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let mut db = Database::in_memory();
        let room_id = db
            .transaction(|tx| Ok(tx.create_room(room("office"))?.id))
            .unwrap();

        let result = db.transaction(|tx| {
            tx.update_room(
                &room_id,
                RoomUpdate {
                    name: "Renamed".to_string(),
                    image_url: None,
                    global_minutes: 5,
                },
            )?;
            tx.create_puzzle(short_puzzle(&room_id, "First"))?;
            tx.create_puzzle(NewPuzzle {
                room_id: room_id.clone(),
                kind: PUZZLE_KIND_MCQ.to_string(),
                question: "Broken".to_string(),
                options: vec!["a".to_string()],
                correct_index: Some(3),
                ..Default::default()
            })
        });

        assert!(matches!(result, Err(DbError::Check { .. })));
        assert_eq!(db.find_room(&room_id).unwrap().name, "office");
        assert_eq!(db.find_room(&room_id).unwrap().global_minutes, 10);
        assert_eq!(db.puzzle_count(&room_id), 0);
    }

    #[test]
    fn test_hotspot_requires_puzzle_in_same_room() {
        let mut db = Database::in_memory();
        let result = db.transaction(|tx| {
            let a = tx.create_room(room("a"))?;
            let b = tx.create_room(room("b"))?;
            let puzzle = tx.create_puzzle(short_puzzle(&a.id, "Q"))?;
            tx.create_hotspot(NewHotspot {
                room_id: b.id,
                puzzle_id: Some(puzzle.id),
                ..Default::default()
            })
        });

        assert!(matches!(
            result,
            Err(DbError::ForeignKey {
                column: "puzzle_id",
                ..
            })
        ));
        assert_eq!(db.room_count(), 0);
    }

    #[test]
    fn test_puzzle_delete_restricted_while_referenced() {
        let mut db = Database::in_memory();
        let room_id = db
            .transaction(|tx| {
                let room = tx.create_room(room("office"))?;
                let puzzle = tx.create_puzzle(short_puzzle(&room.id, "Q"))?;
                tx.create_hotspot(NewHotspot {
                    room_id: room.id.clone(),
                    puzzle_id: Some(puzzle.id),
                    ..Default::default()
                })?;
                Ok(room.id)
            })
            .unwrap();

        let blocked = db.transaction(|tx| tx.delete_puzzles(&room_id));
        assert!(matches!(blocked, Err(DbError::ForeignKey { .. })));

        let removed = db
            .transaction(|tx| {
                let hotspots = tx.delete_hotspots(&room_id);
                let puzzles = tx.delete_puzzles(&room_id)?;
                Ok((hotspots, puzzles))
            })
            .unwrap();
        assert_eq!(removed, (1, 1));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let mut db = Database::in_memory();
        db.transaction(|tx| tx.create_room(room("office"))).unwrap();
        let result = db.transaction(|tx| tx.create_room(room("office")));
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
    }

    #[test]
    fn test_puzzle_answer_constraints() {
        let mut db = Database::in_memory();
        let room_id = db
            .transaction(|tx| Ok(tx.create_room(room("office"))?.id))
            .unwrap();

        let blank_answer = db.transaction(|tx| {
            tx.create_puzzle(NewPuzzle {
                expected_answer: Some("  ".to_string()),
                ..short_puzzle(&room_id, "Year?")
            })
        });
        assert!(matches!(blank_answer, Err(DbError::Check { .. })));

        let one_option = db.transaction(|tx| {
            tx.create_puzzle(NewPuzzle {
                room_id: room_id.clone(),
                kind: PUZZLE_KIND_MCQ.to_string(),
                question: "Who?".to_string(),
                options: vec!["Butler".to_string(), " ".to_string()],
                correct_index: Some(0),
                ..Default::default()
            })
        });
        assert!(matches!(one_option, Err(DbError::Check { .. })));
        assert_eq!(db.puzzle_count(&room_id), 0);
    }

    #[test]
    fn test_delete_room_cascades() {
        let mut db = Database::in_memory();
        let (keep, drop) = db
            .transaction(|tx| {
                let keep = tx.create_room(room("keep"))?;
                let drop = tx.create_room(room("drop"))?;
                tx.create_puzzle(short_puzzle(&keep.id, "Keep"))?;
                let p = tx.create_puzzle(short_puzzle(&drop.id, "Drop"))?;
                tx.create_hotspot(NewHotspot {
                    room_id: drop.id.clone(),
                    puzzle_id: Some(p.id),
                    ..Default::default()
                })?;
                Ok((keep.id, drop.id))
            })
            .unwrap();

        db.delete_room(&drop).unwrap();

        assert!(db.find_room(&drop).is_none());
        assert_eq!(db.puzzle_count(&drop), 0);
        assert_eq!(db.hotspot_count(&drop), 0);
        assert_eq!(db.puzzle_count(&keep), 1);
        assert!(matches!(
            db.delete_room(&drop),
            Err(DbError::RoomNotFound(_))
        ));
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let path = std::env::temp_dir().join(format!("room_db_test_{}.json", new_id()));

        let room_id = {
            let mut db = Database::open(&path).unwrap();
            db.transaction(|tx| {
                let room = tx.create_room(room("persisted"))?;
                tx.create_puzzle(short_puzzle(&room.id, "Still here?"))?;
                Ok(room.id)
            })
            .unwrap()
        };

        let reopened = Database::open(&path).unwrap();
        let loaded = reopened.room_with_children(&room_id).unwrap();
        assert_eq!(loaded.room.slug, "persisted");
        assert_eq!(loaded.puzzles[0].question, "Still here?");

        std::fs::remove_file(&path).unwrap();
    }
}
