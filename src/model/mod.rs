//! Data models for the escape room builder.

mod hotspot;
mod ids;
mod puzzle;
mod settings;

pub use hotspot::Hotspot;
pub use ids::{HotspotId, PuzzleId};
pub use puzzle::{
    Answer, AnswerRule, MIN_MCQ_OPTIONS, Puzzle, PuzzleDraft, PuzzleField, PuzzleKind,
    ValidationError,
};
pub use settings::Settings;
