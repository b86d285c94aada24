//! Demo room.

use room_db::{
    Database, DbError, NewHotspot, NewPuzzle, NewRoom, PUZZLE_KIND_MCQ, PUZZLE_KIND_SHORT, RoomRow,
};

/// Slug of the demo room.
pub const DEMO_SLUG: &str = "detective-office";

/// Insert "The Detective's Office", replacing an earlier copy.
pub fn seed_demo_room(db: &mut Database) -> Result<RoomRow, DbError> {
    let room = db.transaction(|tx| {
        let existing = tx.find_room_by_slug(DEMO_SLUG).map(|r| r.id.clone());
        if let Some(id) = existing {
            tx.delete_room(&id)?;
            log::debug!("Replacing existing demo room {}", id);
        }

        let room = tx.create_room(NewRoom {
            slug: DEMO_SLUG.to_string(),
            name: "The Detective's Office".to_string(),
            description: Some(
                "A messy office filled with clues from a cold case. Find the safe code to escape."
                    .to_string(),
            ),
            theme: Some("Noir".to_string()),
            image_url: Some("/images/rooms/detective-office.jpg".to_string()),
            global_minutes: 45,
        })?;

        let calendar = tx.create_puzzle(NewPuzzle {
            room_id: room.id.clone(),
            kind: PUZZLE_KIND_SHORT.to_string(),
            question: "What is the year on the calendar?".to_string(),
            expected_answer: Some("1985".to_string()),
            clue: Some("Look closely at the wall near the window.".to_string()),
            image_url: Some("/images/puzzles/calendar.jpg".to_string()),
            ..Default::default()
        })?;

        tx.create_puzzle(NewPuzzle {
            room_id: room.id.clone(),
            kind: PUZZLE_KIND_MCQ.to_string(),
            question: "Who is the prime suspect?".to_string(),
            options: ["The Butler", "The Gardener", "The Chef", "The Driver"]
                .into_iter()
                .map(String::from)
                .collect(),
            correct_index: Some(0),
            clue: Some("He was the only one with a key.".to_string()),
            ..Default::default()
        })?;

        tx.create_hotspot(NewHotspot {
            room_id: room.id.clone(),
            puzzle_id: Some(calendar.id),
            x: 10.5,
            y: 20.0,
            width: 15.0,
            height: 10.0,
        })?;
        // Decorative
        tx.create_hotspot(NewHotspot {
            room_id: room.id.clone(),
            puzzle_id: None,
            x: 80.0,
            y: 50.0,
            width: 5.0,
            height: 5.0,
        })?;

        Ok(room)
    })?;

    log::info!("Seeded demo room {} ({})", room.name, room.id);
    Ok(room)
}
