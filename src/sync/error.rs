//! Errors reported by persistence sync.

use std::fmt;

use thiserror::Error;

/// The kind of request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Save,
    Load,
    Delete,
}

impl fmt::Display for SyncOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncOp::Save => "save",
            SyncOp::Load => "load",
            SyncOp::Delete => "delete",
        })
    }
}

/// Errors from save/load/delete. Local state is never modified when one of
/// these is returned, so the request can simply be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The room id does not resolve on the server
    #[error("Room not found: {0}")]
    NotFound(String),

    /// The server answered with an error or could not be reached
    #[error("Request failed ({status}): {message}")]
    Transport { status: u16, message: String },

    /// Another request is still running
    #[error("A {0} request is already in progress")]
    Busy(SyncOp),

    /// The server's answer could not be turned into a room
    #[error("Invalid room data: {0}")]
    Decode(String),
}
