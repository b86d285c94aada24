//! Escape Room Builder
//!
//! Authoring and play engine for point-and-click escape rooms: hotspots
//! placed on a background image, puzzles linked to them, a countdown in play
//! mode, and whole-room persistence through a small room service.

pub mod api;
pub mod config;
pub mod constants;
pub mod geometry;
pub mod image_source;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod payload;
pub mod play;
pub mod seed;
pub mod session;
pub mod store;
pub mod sync;

pub use session::{Confirmation, Mode, Session, SessionError};
