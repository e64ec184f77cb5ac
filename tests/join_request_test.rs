//! Tests for the private-club join request flow and its moderation.

use std::sync::Arc;
use toque::clubs::{
    ClubError, ClubManager, ClubVisibility, Decision, MembershipState, ModerationError,
    ModerationQueue, RequestStatus,
};
use toque::cooks::ProfileManager;
use toque::storage::Database;
use uuid::Uuid;

fn setup() -> (Arc<Database>, ClubManager, ModerationQueue) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to create database"));
    let clubs = ClubManager::new(db.clone());
    let moderation = ModerationQueue::new(db.clone());
    (db, clubs, moderation)
}

fn new_cook(db: &Arc<Database>) -> Uuid {
    let cook_id = Uuid::new_v4();
    ProfileManager::new(db.clone())
        .get_or_create_profile(&cook_id)
        .expect("Failed to create cook");
    cook_id
}

#[test]
fn test_request_creates_pending_state() {
    let (db, clubs, _) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();

    let request = clubs.request_to_join(club.id, cook).expect("Failed to request");
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(
        clubs.membership_state(club.id, cook).unwrap(),
        MembershipState::Pending
    );
}

#[test]
fn test_duplicate_request_is_rejected() {
    let (db, clubs, _) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();

    clubs.request_to_join(club.id, cook).unwrap();
    let result = clubs.request_to_join(club.id, cook);
    assert!(matches!(result, Err(ClubError::DuplicateRequest)));

    // Still exactly one pending row for the pair.
    let pending: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM join_requests WHERE club_id = ?1 AND status = 'pending'",
            [club.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(pending, 1);
}

#[test]
fn test_public_club_refuses_requests() {
    let (db, clubs, _) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club("Open Oven".to_string(), None, ClubVisibility::Public, owner)
        .unwrap();

    let result = clubs.request_to_join(club.id, cook);
    assert!(matches!(result, Err(ClubError::PublicClub)));
}

#[test]
fn test_member_cannot_request() {
    let (db, clubs, moderation) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();

    let request = clubs.request_to_join(club.id, cook).unwrap();
    moderation
        .decide(request.id, Decision::Approve, owner)
        .unwrap();

    let result = clubs.request_to_join(club.id, cook);
    assert!(matches!(result, Err(ClubError::AlreadyMember)));
}

#[test]
fn test_listing_pending_is_owner_only() {
    let (db, clubs, moderation) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);
    let other = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();
    clubs.request_to_join(club.id, cook).unwrap();

    let pending = moderation.pending_requests(club.id, owner).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].cook_id, cook);

    let refused = moderation.pending_requests(club.id, other);
    assert!(matches!(refused, Err(ModerationError::NotAuthorized)));
}

#[test]
fn test_approval_creates_membership_atomically() {
    let (db, clubs, moderation) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();
    let request = clubs.request_to_join(club.id, cook).unwrap();

    let status = moderation
        .decide(request.id, Decision::Approve, owner)
        .expect("Failed to approve");
    assert_eq!(status, RequestStatus::Approved);

    assert_eq!(
        clubs.membership_state(club.id, cook).unwrap(),
        MembershipState::Member
    );

    // Exactly one owner after the membership mutation.
    let owners: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM club_members WHERE club_id = ?1 AND role = 'owner'",
            [club.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(owners, 1);
}

#[test]
fn test_rejection_locks_out_further_requests() {
    let (db, clubs, moderation) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();
    let request = clubs.request_to_join(club.id, cook).unwrap();

    let status = moderation
        .decide(request.id, Decision::Reject, owner)
        .expect("Failed to reject");
    assert_eq!(status, RequestStatus::Rejected);

    assert_eq!(
        clubs.membership_state(club.id, cook).unwrap(),
        MembershipState::Rejected
    );

    // A fresh request is blocked, not silently re-created.
    let retry = clubs.request_to_join(club.id, cook);
    assert!(matches!(retry, Err(ClubError::RequestRejected)));
}

#[test]
fn test_second_decision_observes_already_decided() {
    let (db, clubs, moderation) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();
    let request = clubs.request_to_join(club.id, cook).unwrap();

    moderation
        .decide(request.id, Decision::Approve, owner)
        .unwrap();

    // The losing decision does not overwrite the winner.
    let second = moderation.decide(request.id, Decision::Reject, owner);
    assert!(matches!(second, Err(ModerationError::AlreadyDecided)));

    assert_eq!(
        clubs.membership_state(club.id, cook).unwrap(),
        MembershipState::Member
    );
}

#[test]
fn test_deciding_is_owner_only() {
    let (db, clubs, moderation) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);
    let other = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();
    let request = clubs.request_to_join(club.id, cook).unwrap();

    let refused = moderation.decide(request.id, Decision::Approve, other);
    assert!(matches!(refused, Err(ModerationError::NotAuthorized)));

    // The request is still pending for the real owner.
    let pending = moderation.pending_requests(club.id, owner).unwrap();
    assert_eq!(pending.len(), 1);
}

#[test]
fn test_deciding_unknown_request() {
    let (db, _, moderation) = setup();
    let owner = new_cook(&db);

    let result = moderation.decide(Uuid::new_v4(), Decision::Approve, owner);
    assert!(matches!(result, Err(ModerationError::NotFound(_))));
}

#[test]
fn test_leaving_clears_request_history() {
    let (db, clubs, moderation) = setup();
    let owner = new_cook(&db);
    let cook = new_cook(&db);

    let club = clubs
        .create_club(
            "Secret Supper".to_string(),
            None,
            ClubVisibility::Private,
            owner,
        )
        .unwrap();
    let request = clubs.request_to_join(club.id, cook).unwrap();
    moderation
        .decide(request.id, Decision::Approve, owner)
        .unwrap();

    clubs.leave_club(club.id, cook).unwrap();
    assert_eq!(
        clubs.membership_state(club.id, cook).unwrap(),
        MembershipState::NonMember
    );

    // With the residue cleared, a new request can be made.
    let fresh = clubs.request_to_join(club.id, cook).expect("Fresh request");
    assert_eq!(fresh.status, RequestStatus::Pending);
}
