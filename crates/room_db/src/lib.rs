//! Transactional table store for escape rooms, their puzzles and hotspots.
//!
//! Rows live in memory and can optionally be snapshotted to a JSON file on
//! every commit. The store enforces the relational constraints the room
//! graph relies on: rooms own their puzzles and hotspots (cascade on room
//! delete), a hotspot may reference one puzzle of the same room, and a
//! puzzle cannot be removed while a hotspot still points at it.

pub mod db;
pub mod error;
pub mod rows;

pub use db::{Database, Transaction};
pub use error::{DbError, Result};
pub use rows::{
    HotspotRow, NewHotspot, NewPuzzle, NewRoom, PuzzleRow, RoomRow, RoomUpdate, RoomWithChildren,
    PUZZLE_KIND_MCQ, PUZZLE_KIND_SHORT,
};
