//! Save-then-load preserves the room graph.

use super::*;
use crate::model::{AnswerRule, PuzzleId};
use crate::sync::build_payload;

#[test]
fn test_save_then_load_preserves_links_by_content() {
    let mut sync = local_sync();
    let (mut room, _) = sample_room();

    let saved = sync.save(&mut room).unwrap();
    let loaded = sync.load(&saved.room_id).unwrap();

    assert_eq!(loaded.settings.room_id.as_deref(), Some(saved.room_id.as_str()));
    assert_eq!(loaded.settings.name, "The Lab");
    assert_eq!(loaded.settings.global_minutes, 12);
    assert_eq!(loaded.puzzles.len(), 2);
    assert_eq!(loaded.hotspots.len(), 3);
    assert!(loaded.dangling_links().is_empty());

    // Hotspots come back in order; compare what each one links to by content
    for (before, after) in room.hotspots.iter().zip(loaded.hotspots.iter()) {
        assert_eq!(before.position, after.position);
        let before = room.puzzle_for(&before.id);
        let after = loaded.puzzle_for(&after.id);
        match (before, after) {
            (None, None) => {}
            (Some(b), Some(a)) => {
                assert_eq!(b.question, a.question);
                assert_eq!(b.rule, a.rule);
                assert_eq!(b.clue, a.clue);
            }
            other => panic!("link changed across save/load: {other:?}"),
        }
    }
}

#[test]
fn test_save_assigns_room_id_and_slug() {
    let mut sync = local_sync();
    let (mut room, _) = sample_room();
    assert!(!room.settings.is_saved());

    let saved = sync.save(&mut room).unwrap();

    assert_eq!(room.settings.room_id.as_deref(), Some(saved.room_id.as_str()));
    assert!(saved.slug.starts_with("the-lab-"), "slug = {}", saved.slug);
}

#[test]
fn test_resave_updates_same_room_without_accumulating() {
    let mut sync = local_sync();
    let (mut room, [a, ..]) = sample_room();

    let first = sync.save(&mut room).unwrap();
    room.delete_hotspot(&a).unwrap();
    room.settings.name = "The Lab, revised".to_string();
    let second = sync.save(&mut room).unwrap();

    assert_eq!(first.room_id, second.room_id);
    let db = sync.backend().api().db();
    assert_eq!(db.room_count(), 1);
    assert_eq!(db.puzzle_count(&second.room_id), 2);
    assert_eq!(db.hotspot_count(&second.room_id), 2);
    assert_eq!(db.find_room(&second.room_id).unwrap().name, "The Lab, revised");
    // Slug is fixed at creation
    assert_eq!(first.slug, second.slug);
}

#[test]
fn test_reloaded_room_can_be_saved_again() {
    let mut sync = local_sync();
    let (mut room, _) = sample_room();
    let saved = sync.save(&mut room).unwrap();

    let mut loaded = sync.load(&saved.room_id).unwrap();
    let again = sync.save(&mut loaded).unwrap();
    let reloaded = sync.load(&again.room_id).unwrap();

    assert_eq!(again.room_id, saved.room_id);
    assert_eq!(reloaded.puzzles.len(), 2);
    assert_eq!(reloaded.hotspots.linked_count(), 2);
}

#[test]
fn test_stale_room_id_creates_new_room() {
    let mut sync = local_sync();
    let (mut room, _) = sample_room();
    room.settings.room_id = Some("gone".to_string());

    let saved = sync.save(&mut room).unwrap();

    assert_ne!(saved.room_id, "gone");
    assert_eq!(room.settings.room_id.as_deref(), Some(saved.room_id.as_str()));
    assert_eq!(sync.backend().api().db().room_count(), 1);
}

#[test]
fn test_unmapped_puzzle_link_saves_as_null() {
    let mut sync = local_sync();
    let (room, _) = sample_room();
    let mut payload = build_payload(&room);
    payload.hotspots[0].puzzle_id = Some(PuzzleId::new("never-saved"));

    let saved = sync.backend_mut().api_mut().save(&payload).unwrap();
    let loaded = sync.load(&saved.room_id).unwrap();

    let first = loaded.hotspots.iter().next().unwrap();
    assert!(first.puzzle_id.is_none());
    assert_eq!(loaded.hotspots.linked_count(), 1);
    assert!(loaded.dangling_links().is_empty());
}

#[test]
fn test_puzzle_ids_are_preserved_on_load() {
    let mut sync = local_sync();
    let (mut room, _) = sample_room();
    let saved = sync.save(&mut room).unwrap();

    let loaded = sync.load(&saved.room_id).unwrap();
    let db_rows = sync
        .backend()
        .api()
        .db()
        .room_with_children(&saved.room_id)
        .unwrap();

    let loaded_ids: Vec<_> = loaded.puzzles.iter().map(|p| p.id.as_str().to_string()).collect();
    let row_ids: Vec<_> = db_rows.puzzles.iter().map(|p| p.id.clone()).collect();
    assert_eq!(loaded_ids, row_ids);
    assert!(matches!(
        loaded.puzzles.iter().next().unwrap().rule,
        AnswerRule::MultipleChoice { correct_index: 1, .. }
    ));
}
