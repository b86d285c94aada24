//! JSON shapes exchanged between the builder and the room service.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::geometry::Pct;
use crate::model::{
    AnswerRule, Hotspot, HotspotId, Puzzle, PuzzleDraft, PuzzleId, PuzzleKind, ValidationError,
};

/// Room settings as sent and returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub global_minutes: u32,
    /// Background image data URL. Older clients call it `bgImageDataUrl`.
    #[serde(default, alias = "bgImageDataUrl")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One puzzle on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRecord {
    pub id: PuzzleId,
    #[serde(rename = "type")]
    pub kind: PuzzleKind,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_index: Option<u32>,
    #[serde(default)]
    pub expected_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clue: Option<String>,
}

impl PuzzleRecord {
    /// Rebuild the puzzle this record describes, keeping its id.
    pub fn to_puzzle(&self) -> Result<Puzzle, ValidationError> {
        let draft = PuzzleDraft {
            id: Some(self.id.clone()),
            kind: self.kind,
            question: self.question.clone(),
            options: self.options.clone(),
            correct_index: self.correct_index.map(|i| i as usize),
            expected_answer: self.expected_answer.clone(),
            image_data_url: self.image_data_url.clone(),
            clue: self.clue.clone(),
        };
        draft.validate(self.id.clone())
    }
}

impl From<&Puzzle> for PuzzleRecord {
    fn from(puzzle: &Puzzle) -> Self {
        let (options, correct_index, expected_answer) = match &puzzle.rule {
            AnswerRule::MultipleChoice {
                options,
                correct_index,
            } => (
                options.clone(),
                u32::try_from(*correct_index).ok(),
                String::new(),
            ),
            AnswerRule::ShortAnswer { expected } => (Vec::new(), None, expected.clone()),
        };
        Self {
            id: puzzle.id.clone(),
            kind: puzzle.kind(),
            question: puzzle.question.clone(),
            options,
            correct_index,
            expected_answer,
            image_data_url: puzzle.image_data_url.clone(),
            clue: puzzle.clue.clone(),
        }
    }
}

/// One hotspot on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotRecord {
    pub id: HotspotId,
    #[serde(default)]
    pub puzzle_id: Option<PuzzleId>,
    pub x_pct: f64,
    pub y_pct: f64,
}

impl From<&Hotspot> for HotspotRecord {
    fn from(hotspot: &Hotspot) -> Self {
        Self {
            id: hotspot.id.clone(),
            puzzle_id: hotspot.puzzle_id.clone(),
            x_pct: hotspot.position.x,
            y_pct: hotspot.position.y,
        }
    }
}

impl From<&HotspotRecord> for Hotspot {
    fn from(record: &HotspotRecord) -> Self {
        let mut hotspot = Hotspot::new(record.id.clone(), Pct::new(record.x_pct, record.y_pct));
        hotspot.puzzle_id = record.puzzle_id.clone();
        hotspot
    }
}

/// Body of `POST /rooms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub settings: SettingsRecord,
    #[serde(default)]
    pub puzzles: Vec<PuzzleRecord>,
    #[serde(default)]
    pub hotspots: Vec<HotspotRecord>,
}

/// Successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub room_id: String,
    pub slug: String,
}

/// Body of a successful `GET /rooms/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResponse {
    pub settings: SettingsRecord,
    #[serde(default)]
    pub puzzles: Vec<PuzzleRecord>,
    #[serde(default)]
    pub hotspots: Vec<HotspotRecord>,
}

/// Body of a successful `DELETE /rooms/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
