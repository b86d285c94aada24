//! In-memory stores for the room graph.

mod error;
mod hotspots;
mod puzzles;
mod room;

pub use error::StoreError;
pub use hotspots::HotspotStore;
pub use puzzles::PuzzleStore;
pub use room::Room;
