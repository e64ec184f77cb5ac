//! Tests for club registrations in challenges.

use chrono::{Duration, Utc};
use std::sync::Arc;
use toque::challenges::{
    ChallengeError, ChallengeManager, ClubEntryManager, RegistrationOutcome,
};
use toque::clubs::{ClubManager, ClubVisibility};
use toque::cooks::ProfileManager;
use toque::storage::Database;
use uuid::Uuid;

struct Fixture {
    db: Arc<Database>,
    clubs: ClubManager,
    challenges: ChallengeManager,
    entries: ClubEntryManager,
}

fn setup() -> Fixture {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    Fixture {
        clubs: ClubManager::new(db.clone()),
        challenges: ChallengeManager::new(db.clone()),
        entries: ClubEntryManager::new(db.clone()),
        db,
    }
}

fn new_cook(db: &Arc<Database>) -> Uuid {
    let cook_id = Uuid::new_v4();
    ProfileManager::new(db.clone())
        .get_or_create_profile(&cook_id)
        .expect("Failed to create cook");
    cook_id
}

fn outcome_for(results: &[toque::challenges::ClubRegistration], club_id: Uuid) -> RegistrationOutcome {
    results
        .iter()
        .find(|r| r.club_id == club_id)
        .expect("missing club outcome")
        .outcome
}

#[test]
fn test_owner_registers_own_clubs() {
    let f = setup();
    let owner = new_cook(&f.db);

    let a = f
        .clubs
        .create_club("Club A".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();
    let b = f
        .clubs
        .create_club("Club B".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();
    let challenge = f
        .challenges
        .create_challenge(
            "Team Bake-Off".to_string(),
            None,
            Utc::now(),
            Utc::now() + Duration::days(7),
            200,
        )
        .unwrap();

    let results = f
        .entries
        .register_clubs(challenge.id, &[a.id, b.id], owner)
        .expect("Failed to register");

    assert_eq!(outcome_for(&results, a.id), RegistrationOutcome::Registered);
    assert_eq!(outcome_for(&results, b.id), RegistrationOutcome::Registered);

    let registered = f.entries.registered_clubs(challenge.id).unwrap();
    assert_eq!(registered.len(), 2);
}

#[test]
fn test_batch_partially_succeeds_for_unowned_clubs() {
    let f = setup();
    let owner = new_cook(&f.db);
    let rival = new_cook(&f.db);

    let mine = f
        .clubs
        .create_club("Mine".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();
    let theirs = f
        .clubs
        .create_club("Theirs".to_string(), None, ClubVisibility::Public, rival)
        .unwrap();
    let missing = Uuid::new_v4();
    let challenge = f
        .challenges
        .create_challenge(
            "Team Bake-Off".to_string(),
            None,
            Utc::now(),
            Utc::now() + Duration::days(7),
            200,
        )
        .unwrap();

    let results = f
        .entries
        .register_clubs(challenge.id, &[mine.id, theirs.id, missing], owner)
        .expect("Batch should report per-club outcomes");

    assert_eq!(outcome_for(&results, mine.id), RegistrationOutcome::Registered);
    assert_eq!(
        outcome_for(&results, theirs.id),
        RegistrationOutcome::NotClubOwner
    );
    assert_eq!(
        outcome_for(&results, missing),
        RegistrationOutcome::ClubNotFound
    );

    // Only the owned club landed.
    let registered = f.entries.registered_clubs(challenge.id).unwrap();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].club_id, mine.id);
}

#[test]
fn test_registration_is_idempotent() {
    let f = setup();
    let owner = new_cook(&f.db);

    let club = f
        .clubs
        .create_club("Club".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();
    let challenge = f
        .challenges
        .create_challenge(
            "Team Bake-Off".to_string(),
            None,
            Utc::now(),
            Utc::now() + Duration::days(7),
            200,
        )
        .unwrap();

    f.entries
        .register_clubs(challenge.id, &[club.id], owner)
        .unwrap();
    let results = f
        .entries
        .register_clubs(challenge.id, &[club.id], owner)
        .unwrap();

    assert_eq!(
        outcome_for(&results, club.id),
        RegistrationOutcome::AlreadyRegistered
    );
    assert_eq!(f.entries.registered_clubs(challenge.id).unwrap().len(), 1);
}

#[test]
fn test_remove_club_leaves_others_registered() {
    let f = setup();
    let owner = new_cook(&f.db);

    let a = f
        .clubs
        .create_club("Club A".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();
    let b = f
        .clubs
        .create_club("Club B".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();
    let challenge = f
        .challenges
        .create_challenge(
            "Team Bake-Off".to_string(),
            None,
            Utc::now(),
            Utc::now() + Duration::days(7),
            200,
        )
        .unwrap();
    f.entries
        .register_clubs(challenge.id, &[a.id, b.id], owner)
        .unwrap();

    f.entries
        .remove_club(challenge.id, a.id, owner)
        .expect("Failed to remove");

    let registered = f.entries.registered_clubs(challenge.id).unwrap();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].club_id, b.id);

    // Removal is terminal for that registration.
    let again = f.entries.remove_club(challenge.id, a.id, owner);
    assert!(matches!(again, Err(ChallengeError::NotRegistered)));
}

#[test]
fn test_remove_is_owner_only() {
    let f = setup();
    let owner = new_cook(&f.db);
    let rival = new_cook(&f.db);

    let club = f
        .clubs
        .create_club("Club".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();
    let challenge = f
        .challenges
        .create_challenge(
            "Team Bake-Off".to_string(),
            None,
            Utc::now(),
            Utc::now() + Duration::days(7),
            200,
        )
        .unwrap();
    f.entries
        .register_clubs(challenge.id, &[club.id], owner)
        .unwrap();

    let refused = f.entries.remove_club(challenge.id, club.id, rival);
    assert!(matches!(refused, Err(ChallengeError::NotClubOwner(_))));
    assert_eq!(f.entries.registered_clubs(challenge.id).unwrap().len(), 1);
}

#[test]
fn test_registering_for_unknown_challenge() {
    let f = setup();
    let owner = new_cook(&f.db);

    let club = f
        .clubs
        .create_club("Club".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();

    let result = f.entries.register_clubs(Uuid::new_v4(), &[club.id], owner);
    assert!(matches!(result, Err(ChallengeError::NotFound(_))));
}
