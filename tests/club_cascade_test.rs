//! Tests for club deletion and its cascade.

use chrono::{Duration, Utc};
use std::sync::Arc;
use toque::challenges::{ChallengeManager, ClubEntryManager};
use toque::clubs::{ClubError, ClubManager, ClubVisibility, Decision, ModerationQueue};
use toque::cooks::ProfileManager;
use toque::events::{ChangeEvent, ChangeFeed};
use toque::storage::Database;
use uuid::Uuid;

fn new_cook(db: &Arc<Database>) -> Uuid {
    let cook_id = Uuid::new_v4();
    ProfileManager::new(db.clone())
        .get_or_create_profile(&cook_id)
        .expect("Failed to create cook");
    cook_id
}

fn count(db: &Arc<Database>, table: &str, column: &str, club_id: Uuid) -> i64 {
    db.connection()
        .query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column),
            [club_id.to_string()],
            |row| row.get(0),
        )
        .unwrap()
}

/// Build a club with members, a pending request, chat traffic, and a
/// challenge registration.
fn populate(db: &Arc<Database>) -> (Uuid, Uuid) {
    let clubs = ClubManager::new(db.clone());
    let moderation = ModerationQueue::new(db.clone());
    let challenges = ChallengeManager::new(db.clone());
    let entries = ClubEntryManager::new(db.clone());

    let owner = new_cook(db);
    let member = new_cook(db);
    let applicant = new_cook(db);

    let club = clubs
        .create_club(
            "Doomed Club".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();

    let request = clubs.request_to_join(club.id, member).unwrap();
    moderation
        .decide(request.id, Decision::Approve, owner)
        .unwrap();
    clubs.request_to_join(club.id, applicant).unwrap();

    clubs
        .post_message(club.id, owner, "Welcome!".to_string())
        .unwrap();
    clubs
        .post_message(club.id, member, "Glad to be here".to_string())
        .unwrap();

    let challenge = challenges
        .create_challenge(
            "Team Bake-Off".to_string(),
            None,
            Utc::now(),
            Utc::now() + Duration::days(7),
            200,
        )
        .unwrap();
    entries
        .register_clubs(challenge.id, &[club.id], owner)
        .unwrap();

    (club.id, owner)
}

#[test]
fn test_cascade_removes_everything_attached() {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    let (club_id, owner) = populate(&db);

    assert_eq!(count(&db, "club_members", "club_id", club_id), 2);
    assert_eq!(count(&db, "join_requests", "club_id", club_id), 2);
    assert_eq!(count(&db, "club_messages", "club_id", club_id), 2);
    assert_eq!(count(&db, "club_challenge_entries", "club_id", club_id), 1);

    let clubs = ClubManager::new(db.clone());
    clubs.delete_club(club_id, owner).expect("Failed to delete");

    assert_eq!(count(&db, "club_members", "club_id", club_id), 0);
    assert_eq!(count(&db, "join_requests", "club_id", club_id), 0);
    assert_eq!(count(&db, "club_messages", "club_id", club_id), 0);
    assert_eq!(count(&db, "club_challenge_entries", "club_id", club_id), 0);
    assert_eq!(count(&db, "clubs", "id", club_id), 0);

    let gone = clubs.get_club(club_id);
    assert!(matches!(gone, Err(ClubError::NotFound(_))));
}

#[test]
fn test_only_owner_may_delete() {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    let (club_id, _owner) = populate(&db);
    let stranger = new_cook(&db);

    let clubs = ClubManager::new(db.clone());
    let refused = clubs.delete_club(club_id, stranger);
    assert!(matches!(refused, Err(ClubError::NotAuthorized)));

    // Nothing was touched.
    assert_eq!(count(&db, "clubs", "id", club_id), 1);
    assert_eq!(count(&db, "club_members", "club_id", club_id), 2);
    assert_eq!(count(&db, "join_requests", "club_id", club_id), 2);
    assert_eq!(count(&db, "club_messages", "club_id", club_id), 2);
    assert_eq!(count(&db, "club_challenge_entries", "club_id", club_id), 1);
}

#[test]
fn test_deletion_publishes_change_event() {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    let (club_id, owner) = populate(&db);

    let feed = Arc::new(ChangeFeed::new());
    let rx = feed.subscribe();
    let clubs = ClubManager::new(db.clone()).with_feed(feed);

    clubs.delete_club(club_id, owner).unwrap();

    let events: Vec<ChangeEvent> = rx.try_iter().collect();
    assert!(events.contains(&ChangeEvent::ClubDeleted { club_id }));
}

#[test]
fn test_deleting_unknown_club() {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    let owner = new_cook(&db);

    let clubs = ClubManager::new(db.clone());
    let result = clubs.delete_club(Uuid::new_v4(), owner);
    assert!(matches!(result, Err(ClubError::NotFound(_))));
}
