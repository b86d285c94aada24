//! Row types stored in the room tables.

use serde::{Deserialize, Serialize};

/// Stored `kind` for short-answer puzzles.
pub const PUZZLE_KIND_SHORT: &str = "short";

/// Stored `kind` for multiple-choice puzzles.
pub const PUZZLE_KIND_MCQ: &str = "mcq";

/// A room and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRow {
    pub id: String,
    /// URL-safe unique name.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    /// Background image, usually a data URL.
    #[serde(default)]
    pub image_url: Option<String>,
    pub global_minutes: u32,
}

/// A puzzle owned by a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleRow {
    pub id: String,
    pub room_id: String,
    /// Either [`PUZZLE_KIND_SHORT`] or [`PUZZLE_KIND_MCQ`].
    pub kind: String,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_index: Option<u32>,
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub clue: Option<String>,
}

/// A hotspot owned by a room, optionally pointing at one of its puzzles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotRow {
    pub id: String,
    pub room_id: String,
    #[serde(default)]
    pub puzzle_id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Values for inserting a room. The id is generated by the store.
#[derive(Debug, Clone, Default)]
pub struct NewRoom {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub theme: Option<String>,
    pub image_url: Option<String>,
    pub global_minutes: u32,
}

/// Metadata written by a room update.
#[derive(Debug, Clone, Default)]
pub struct RoomUpdate {
    pub name: String,
    pub image_url: Option<String>,
    pub global_minutes: u32,
}

/// Values for inserting a puzzle.
#[derive(Debug, Clone, Default)]
pub struct NewPuzzle {
    pub room_id: String,
    pub kind: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: Option<u32>,
    pub expected_answer: Option<String>,
    pub image_url: Option<String>,
    pub clue: Option<String>,
}

/// Values for inserting a hotspot.
#[derive(Debug, Clone, Default)]
pub struct NewHotspot {
    pub room_id: String,
    pub puzzle_id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A room fetched together with its children, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomWithChildren {
    pub room: RoomRow,
    pub puzzles: Vec<PuzzleRow>,
    pub hotspots: Vec<HotspotRow>,
}
