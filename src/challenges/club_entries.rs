//! Club participation in challenges.
//!
//! A club owner can register any number of owned clubs for a challenge
//! and withdraw them again. Registration is idempotent per club.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::manager::ChallengeError;
use super::types::{ClubChallengeEntry, ClubRegistration, RegistrationOutcome};
use crate::events::{ChangeEvent, ChangeFeed};
use crate::storage::{ChallengeStore, ClubStore, Database, DatabaseError};

/// Manager for club challenge registrations.
pub struct ClubEntryManager {
    db: Arc<Database>,
    feed: Option<Arc<ChangeFeed>>,
}

impl ClubEntryManager {
    /// Create a new club entry manager.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db, feed: None }
    }

    /// Attach a change feed that receives an event after each mutation.
    pub fn with_feed(mut self, feed: Arc<ChangeFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    fn notify(&self, event: ChangeEvent) {
        if let Some(feed) = &self.feed {
            feed.publish(event);
        }
    }

    /// Register clubs for a challenge.
    ///
    /// The batch partially succeeds: each club is reported with its own
    /// outcome, and clubs the actor does not own are skipped rather than
    /// failing the whole call. Already-registered clubs are skipped too.
    pub fn register_clubs(
        &self,
        challenge_id: Uuid,
        club_ids: &[Uuid],
        acting_id: Uuid,
    ) -> Result<Vec<ClubRegistration>, ChallengeError> {
        let challenge_store = ChallengeStore::new(self.db.connection());
        challenge_store
            .get_challenge(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotFound(challenge_id))?;

        let club_store = ClubStore::new(self.db.connection());
        let mut results = Vec::with_capacity(club_ids.len());

        for &club_id in club_ids {
            let club = club_store
                .get_club(&club_id)
                .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

            let Some(club) = club else {
                results.push(ClubRegistration {
                    club_id,
                    outcome: RegistrationOutcome::ClubNotFound,
                });
                continue;
            };

            if club.owner_cook_id != acting_id {
                tracing::warn!(
                    "Cook {} tried to register club {} they do not own",
                    acting_id,
                    club_id
                );
                results.push(ClubRegistration {
                    club_id,
                    outcome: RegistrationOutcome::NotClubOwner,
                });
                continue;
            }

            if challenge_store
                .is_club_registered(&challenge_id, &club_id)
                .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            {
                results.push(ClubRegistration {
                    club_id,
                    outcome: RegistrationOutcome::AlreadyRegistered,
                });
                continue;
            }

            let entry = ClubChallengeEntry {
                id: Uuid::new_v4(),
                challenge_id,
                club_id,
                registered_by: acting_id,
                registered_at: Utc::now(),
            };

            let outcome = match challenge_store.insert_club_entry(&entry) {
                // A concurrent registration won the uniqueness race.
                Err(DatabaseError::ConstraintViolation(_)) => {
                    RegistrationOutcome::AlreadyRegistered
                }
                Err(e) => return Err(ChallengeError::DatabaseError(e.to_string())),
                Ok(()) => {
                    tracing::info!(
                        "Cook {} registered club {} for challenge {}",
                        acting_id,
                        club_id,
                        challenge_id
                    );
                    self.notify(ChangeEvent::ClubRegistrationChanged {
                        challenge_id,
                        club_id,
                    });
                    RegistrationOutcome::Registered
                }
            };

            results.push(ClubRegistration { club_id, outcome });
        }

        Ok(results)
    }

    /// Withdraw a club from a challenge. Owner only, irreversible.
    pub fn remove_club(
        &self,
        challenge_id: Uuid,
        club_id: Uuid,
        acting_id: Uuid,
    ) -> Result<(), ChallengeError> {
        let challenge_store = ChallengeStore::new(self.db.connection());
        challenge_store
            .get_challenge(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotFound(challenge_id))?;

        let club = ClubStore::new(self.db.connection())
            .get_club(&club_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::ClubNotFound(club_id))?;

        if club.owner_cook_id != acting_id {
            return Err(ChallengeError::NotClubOwner(club_id));
        }

        let rows_removed = challenge_store
            .delete_club_entry(&challenge_id, &club_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        if rows_removed == 0 {
            return Err(ChallengeError::NotRegistered);
        }

        tracing::info!(
            "Cook {} withdrew club {} from challenge {}",
            acting_id,
            club_id,
            challenge_id
        );
        self.notify(ChangeEvent::ClubRegistrationChanged {
            challenge_id,
            club_id,
        });

        Ok(())
    }

    /// Get all club registrations for a challenge.
    pub fn registered_clubs(
        &self,
        challenge_id: Uuid,
    ) -> Result<Vec<ClubChallengeEntry>, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        store
            .get_challenge(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotFound(challenge_id))?;

        store
            .club_entries_for(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))
    }
}
