//! Persistence sync: the only bridge between the room graph and storage.
//!
//! Saves always send the whole graph; the service replaces the room's
//! children wholesale. Only one request may be in flight at a time.

mod backend;
mod error;

pub use backend::{LocalBackend, RoomBackend};
pub use error::{SyncError, SyncOp};

use std::collections::HashSet;

use crate::model::{Hotspot, Settings};
use crate::payload::{
    HotspotRecord, LoadResponse, PuzzleRecord, SavePayload, SaveResponse, SettingsRecord,
};
use crate::store::{HotspotStore, PuzzleStore, Room};

/// Saves, loads and deletes rooms through a [`RoomBackend`].
#[derive(Debug)]
pub struct PersistenceSync<B> {
    backend: B,
    in_flight: Option<SyncOp>,
}

impl<B: RoomBackend> PersistenceSync<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            in_flight: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The request currently running, if any. Hosts disable the matching
    /// controls while this is set.
    pub fn in_flight(&self) -> Option<SyncOp> {
        self.in_flight
    }

    /// Mark a request as started. Fails if another one is running.
    pub fn begin(&mut self, op: SyncOp) -> Result<(), SyncError> {
        if let Some(running) = self.in_flight {
            log::warn!("Rejected {} while {} is in progress", op, running);
            return Err(SyncError::Busy(running));
        }
        self.in_flight = Some(op);
        Ok(())
    }

    /// Mark the running request as finished.
    pub fn finish(&mut self) {
        self.in_flight = None;
    }

    fn run<T>(
        &mut self,
        op: SyncOp,
        f: impl FnOnce(&mut B) -> Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        self.begin(op)?;
        let result = f(&mut self.backend);
        self.finish();
        if let Err(e) = &result {
            log::warn!("Room {} failed: {}", op, e);
        }
        result
    }

    /// Save the whole room. On success the room remembers its server id so
    /// the next save updates the same room.
    pub fn save(&mut self, room: &mut Room) -> Result<SaveResponse, SyncError> {
        let payload = build_payload(room);
        let saved = self.run(SyncOp::Save, |backend| backend.save_room(&payload))?;
        room.settings.room_id = Some(saved.room_id.clone());
        log::info!("Room saved as {} ({})", saved.room_id, saved.slug);
        Ok(saved)
    }

    /// Fetch a room. The caller replaces its local room with the result;
    /// nothing local is touched when this fails.
    pub fn load(&mut self, room_id: &str) -> Result<Room, SyncError> {
        let response = self.run(SyncOp::Load, |backend| backend.load_room(room_id))?;
        let mut room = room_from_response(response)?;
        if room.settings.room_id.is_none() {
            room.settings.room_id = Some(room_id.to_string());
        }
        log::info!(
            "Loaded room {} ({} puzzles, {} hotspots)",
            room_id,
            room.puzzles.len(),
            room.hotspots.len()
        );
        Ok(room)
    }

    /// Delete a room and everything in it.
    pub fn delete(&mut self, room_id: &str) -> Result<(), SyncError> {
        self.run(SyncOp::Delete, |backend| backend.delete_room(room_id))?;
        log::info!("Room {} deleted", room_id);
        Ok(())
    }
}

/// Serialize the room graph for a save.
pub fn build_payload(room: &Room) -> SavePayload {
    SavePayload {
        room_id: room.settings.room_id.clone(),
        name: room.settings.name.clone(),
        settings: SettingsRecord {
            global_minutes: room.settings.global_minutes,
            background_image: room.settings.background_image.clone(),
            room_id: room.settings.room_id.clone(),
            name: None,
        },
        puzzles: room.puzzles.iter().map(PuzzleRecord::from).collect(),
        hotspots: room.hotspots.iter().map(HotspotRecord::from).collect(),
    }
}

/// Rebuild a room from a load response.
pub fn room_from_response(response: LoadResponse) -> Result<Room, SyncError> {
    let mut puzzles = Vec::with_capacity(response.puzzles.len());
    for record in &response.puzzles {
        let puzzle = record
            .to_puzzle()
            .map_err(|e| SyncError::Decode(format!("puzzle {}: {}", record.id, e)))?;
        puzzles.push(puzzle);
    }
    let known: HashSet<_> = puzzles.iter().map(|p| p.id.clone()).collect();

    let mut hotspots = Vec::with_capacity(response.hotspots.len());
    for record in &response.hotspots {
        if let Some(pid) = record.puzzle_id.as_ref().filter(|pid| !known.contains(*pid)) {
            return Err(SyncError::Decode(format!(
                "hotspot {} links to missing puzzle {}",
                record.id, pid
            )));
        }
        hotspots.push(Hotspot::from(record));
    }

    let defaults = Settings::default();
    let settings = Settings {
        name: response.settings.name.unwrap_or(defaults.name),
        global_minutes: match response.settings.global_minutes {
            0 => defaults.global_minutes,
            minutes => minutes,
        },
        background_image: response.settings.background_image,
        room_id: response.settings.room_id,
    };

    Ok(Room {
        settings,
        puzzles: PuzzleStore::from_puzzles(puzzles),
        hotspots: HotspotStore::from_hotspots(hotspots),
    })
}

#[cfg(test)]
mod tests;
