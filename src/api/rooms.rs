//! Save, load and delete handlers over the room database.

use std::collections::HashMap;

use room_db::{Database, DbError, NewHotspot, NewPuzzle, NewRoom, RoomUpdate, Transaction};

use crate::constants::{DEFAULT_ROOM_NAME, HOTSPOT_HIT_SIZE};
use crate::geometry::clamp_pct;
use crate::model::{HotspotId, PuzzleId, PuzzleKind};
use crate::payload::{
    DeleteResponse, HotspotRecord, LoadResponse, PuzzleRecord, SavePayload, SaveResponse,
    SettingsRecord,
};

use super::slug::{first_free, now_millis, room_slug};
use super::{ApiRequest, ApiResponse, STATUS_NOT_FOUND, STATUS_SERVER_ERROR};

/// The room service.
#[derive(Debug)]
pub struct RoomApi {
    db: Database,
}

impl RoomApi {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Route and answer a raw request.
    pub fn handle_raw(&mut self, method: &str, path: &str, body: &str) -> ApiResponse {
        match ApiRequest::parse(method, path, body) {
            Ok(request) => self.handle(request),
            Err(response) => response,
        }
    }

    pub fn handle(&mut self, request: ApiRequest) -> ApiResponse {
        match request {
            ApiRequest::Save(payload) => match self.save(&payload) {
                Ok(saved) => ApiResponse::ok(&saved),
                Err(e) => {
                    if matches!(e, DbError::ForeignKey { .. }) {
                        log::error!("Referential integrity violated while saving: {}", e);
                    } else {
                        log::error!("Save failed: {}", e);
                    }
                    ApiResponse::error_with_details(
                        STATUS_SERVER_ERROR,
                        "Failed to save room",
                        e.to_string(),
                    )
                }
            },
            ApiRequest::Load(id) => match self.load(&id) {
                Some(room) => ApiResponse::ok(&room),
                None => ApiResponse::error(STATUS_NOT_FOUND, "Room not found"),
            },
            ApiRequest::Delete(id) => match self.db.delete_room(&id) {
                Ok(room) => {
                    log::info!("Deleted room {} ({})", room.id, room.slug);
                    ApiResponse::ok(&DeleteResponse { success: true })
                }
                Err(DbError::RoomNotFound(_)) => {
                    ApiResponse::error(STATUS_NOT_FOUND, "Room not found")
                }
                Err(e) => {
                    log::error!("Delete failed: {}", e);
                    ApiResponse::error_with_details(
                        STATUS_SERVER_ERROR,
                        "Failed to delete room",
                        e.to_string(),
                    )
                }
            },
        }
    }

    /// Save a room graph as one transaction.
    ///
    /// An existing room is updated and its children replaced; an unknown or
    /// missing room id creates a new room. Client puzzle ids are remapped to
    /// the new row ids before hotspots are written, and hotspot links with
    /// no mapping become null.
    pub fn save(&mut self, payload: &SavePayload) -> Result<SaveResponse, DbError> {
        let name = match payload.name.trim() {
            "" => DEFAULT_ROOM_NAME.to_string(),
            name => name.to_string(),
        };
        let slug_base = room_slug(&name, now_millis());

        let saved = self.db.transaction(|tx| {
            let existing = payload
                .room_id
                .as_deref()
                .and_then(|id| tx.find_room(id))
                .map(|room| room.id.clone());
            let room = match existing {
                Some(id) => {
                    let room = tx.update_room(
                        &id,
                        RoomUpdate {
                            name: name.clone(),
                            image_url: payload.settings.background_image.clone(),
                            global_minutes: payload.settings.global_minutes,
                        },
                    )?;
                    let hotspots = tx.delete_hotspots(&id);
                    let puzzles = tx.delete_puzzles(&id)?;
                    log::debug!(
                        "Cleared room {} ({} puzzles, {} hotspots)",
                        id,
                        puzzles,
                        hotspots
                    );
                    room
                }
                None => {
                    if let Some(stale) = &payload.room_id {
                        log::warn!("Room {} no longer exists, creating a new one", stale);
                    }
                    let slug = first_free(&slug_base, |s| tx.slug_exists(s));
                    tx.create_room(NewRoom {
                        slug,
                        name: name.clone(),
                        image_url: payload.settings.background_image.clone(),
                        global_minutes: payload.settings.global_minutes,
                        ..Default::default()
                    })?
                }
            };

            let remap = create_puzzles(tx, &room.id, &payload.puzzles)?;
            create_hotspots(tx, &room.id, &payload.hotspots, &remap)?;

            Ok(SaveResponse {
                room_id: room.id,
                slug: room.slug,
            })
        })?;

        log::info!(
            "Saved room {} ({}): {} puzzles, {} hotspots",
            saved.room_id,
            saved.slug,
            payload.puzzles.len(),
            payload.hotspots.len()
        );
        Ok(saved)
    }

    /// Project a stored room onto the client shapes.
    pub fn load(&self, id: &str) -> Option<LoadResponse> {
        let found = self.db.room_with_children(id)?;

        let settings = SettingsRecord {
            global_minutes: found.room.global_minutes,
            background_image: found.room.image_url,
            room_id: Some(found.room.id),
            name: Some(found.room.name),
        };

        let puzzles = found
            .puzzles
            .into_iter()
            .map(|row| PuzzleRecord {
                id: PuzzleId::new(row.id),
                kind: PuzzleKind::parse(&row.kind).unwrap_or_default(),
                question: row.question,
                options: row.options,
                correct_index: row.correct_index,
                expected_answer: row.expected_answer.unwrap_or_default(),
                image_data_url: row.image_url,
                clue: row.clue,
            })
            .collect();

        let hotspots = found
            .hotspots
            .into_iter()
            .map(|row| HotspotRecord {
                id: HotspotId::new(row.id),
                puzzle_id: row.puzzle_id.map(PuzzleId::new),
                x_pct: row.x,
                y_pct: row.y,
            })
            .collect();

        Some(LoadResponse {
            settings,
            puzzles,
            hotspots,
        })
    }
}

/// Insert puzzles, returning client id → row id.
///
/// Each record is validated with the same rules the loader applies and
/// stored in its normalized form, so every saved room can be loaded again.
fn create_puzzles<'p>(
    tx: &mut Transaction<'_>,
    room_id: &str,
    puzzles: &'p [PuzzleRecord],
) -> Result<HashMap<&'p PuzzleId, String>, DbError> {
    let mut remap = HashMap::with_capacity(puzzles.len());
    for record in puzzles {
        let puzzle = record.to_puzzle().map_err(|e| DbError::Check {
            table: "puzzle",
            message: format!("puzzle {}: {}", record.id, e),
        })?;
        let normalized = PuzzleRecord::from(&puzzle);
        let (correct_index, expected_answer) = match normalized.kind {
            PuzzleKind::Mcq => (normalized.correct_index, None),
            PuzzleKind::Short => (None, Some(normalized.expected_answer)),
        };
        let row = tx.create_puzzle(NewPuzzle {
            room_id: room_id.to_string(),
            kind: normalized.kind.as_str().to_string(),
            question: normalized.question,
            options: normalized.options,
            correct_index,
            expected_answer,
            image_url: normalized.image_data_url,
            clue: normalized.clue,
        })?;
        remap.insert(&record.id, row.id);
    }
    Ok(remap)
}

fn create_hotspots(
    tx: &mut Transaction<'_>,
    room_id: &str,
    hotspots: &[HotspotRecord],
    remap: &HashMap<&PuzzleId, String>,
) -> Result<(), DbError> {
    for record in hotspots {
        let puzzle_id = record
            .puzzle_id
            .as_ref()
            .and_then(|id| remap.get(id).cloned());
        if puzzle_id.is_none() && record.puzzle_id.is_some() {
            log::warn!(
                "Hotspot {} links to unknown puzzle {:?}, saving it unlinked",
                record.id,
                record.puzzle_id
            );
        }
        tx.create_hotspot(NewHotspot {
            room_id: room_id.to_string(),
            puzzle_id,
            x: clamp_pct(record.x_pct),
            y: clamp_pct(record.y_pct),
            width: HOTSPOT_HIT_SIZE,
            height: HOTSPOT_HIT_SIZE,
        })?;
    }
    Ok(())
}
