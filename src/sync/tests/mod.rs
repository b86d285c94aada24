//! Save/load scenarios against an in-memory room service.

mod roundtrip_tests;

use room_db::Database;

use crate::api::RoomApi;
use crate::geometry::Pct;
use crate::model::{HotspotId, PuzzleDraft};
use crate::store::Room;

use super::{LocalBackend, PersistenceSync};

/// Sync layer over a fresh in-memory database.
fn local_sync() -> PersistenceSync<LocalBackend> {
    PersistenceSync::new(LocalBackend::new(RoomApi::new(Database::in_memory())))
}

/// Two puzzles and three hotspots: `a` → mcq, `b` decorative, `c` → short.
fn sample_room() -> (Room, [HotspotId; 3]) {
    let mut room = Room::new();
    room.settings.name = "The Lab".to_string();
    room.settings.global_minutes = 12;

    let mcq = room
        .puzzles
        .create_or_update(PuzzleDraft::mcq("2+2?", ["3", "4"], 1))
        .unwrap();
    let short = room
        .puzzles
        .create_or_update(PuzzleDraft::short("Year?", "1985").with_clue("Calendar"))
        .unwrap();

    let a = room.hotspots.create(Pct::new(10.0, 20.0));
    let b = room.hotspots.create(Pct::new(50.0, 50.0));
    let c = room.hotspots.create(Pct::new(90.0, 75.5));
    room.link_hotspot(&a, &mcq).unwrap();
    room.link_hotspot(&c, &short).unwrap();

    (room, [a, b, c])
}
