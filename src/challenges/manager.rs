//! Challenge participation management.
//!
//! Handles challenge creation and the individual participation
//! lifecycle: participate, submit a cooking session, abandon.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::types::{Challenge, ChallengeEntry, EntryStatus, ParticipationState};
use crate::events::{ChangeEvent, ChangeFeed};
use crate::storage::{ChallengeStore, CookStore, Database, DatabaseError};

/// Challenge manager.
pub struct ChallengeManager {
    db: Arc<Database>,
    feed: Option<Arc<ChangeFeed>>,
}

impl ChallengeManager {
    /// Create a new challenge manager.
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

    /// Create a new challenge.
    pub fn create_challenge(
        &self,
        title: String,
        description: Option<String>,
        starts_at: chrono::DateTime<Utc>,
        ends_at: chrono::DateTime<Utc>,
        reward_xp: u32,
    ) -> Result<Challenge, ChallengeError> {
        if ends_at <= starts_at {
            return Err(ChallengeError::InvalidWindow);
        }

        let challenge = Challenge {
            id: Uuid::new_v4(),
            title,
            description,
            starts_at,
            ends_at,
            reward_xp,
            created_at: Utc::now(),
        };

        let store = ChallengeStore::new(self.db.connection());
        store
            .insert_challenge(&challenge)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        tracing::info!("Created challenge {} ({})", challenge.id, challenge.title);
        Ok(challenge)
    }

    /// Get a challenge by ID.
    pub fn get_challenge(&self, challenge_id: Uuid) -> Result<Challenge, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        store
            .get_challenge(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotFound(challenge_id))
    }

    /// Get challenges whose window is still open.
    pub fn open_challenges(&self) -> Result<Vec<Challenge>, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        store
            .open_challenges(Utc::now())
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))
    }

    /// Enter a challenge.
    pub fn participate(
        &self,
        challenge_id: Uuid,
        cook_id: Uuid,
    ) -> Result<ChallengeEntry, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        let challenge = store
            .get_challenge(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotFound(challenge_id))?;

        let now = Utc::now();
        if !challenge.is_active(now) {
            tracing::warn!(
                "Cook {} tried to enter ended challenge {}",
                cook_id,
                challenge_id
            );
            return Err(ChallengeError::Inactive);
        }

        if store
            .live_entry_for(&challenge_id, &cook_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .is_some()
        {
            return Err(ChallengeError::AlreadyParticipating);
        }

        // Make sure the cook row exists so the reward credit on submission
        // has a row to land on.
        CookStore::new(self.db.connection())
            .get_or_create_cook(&cook_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        let entry = ChallengeEntry {
            id: Uuid::new_v4(),
            challenge_id,
            cook_id,
            status: EntryStatus::InProgress,
            session_id: None,
            started_at: now,
            completed_at: None,
        };

        match store.insert_entry(&entry) {
            // A concurrent participate won the live-uniqueness race.
            Err(DatabaseError::ConstraintViolation(_)) => {
                return Err(ChallengeError::AlreadyParticipating)
            }
            other => other.map_err(|e| ChallengeError::DatabaseError(e.to_string()))?,
        }

        tracing::info!("Cook {} entered challenge {}", cook_id, challenge_id);
        self.notify(ChangeEvent::ParticipationChanged {
            challenge_id,
            cook_id,
        });

        Ok(entry)
    }

    /// Submit a cooking session for an in-progress entry.
    ///
    /// Idempotent: a second submission on a succeeded entry returns the
    /// existing result without granting the reward again. On first
    /// success the status change and the experience credit commit
    /// together.
    pub fn submit(
        &self,
        challenge_id: Uuid,
        cook_id: Uuid,
        session_id: Uuid,
    ) -> Result<ChallengeEntry, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        let challenge = store
            .get_challenge(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotFound(challenge_id))?;

        let entry = store
            .live_entry_for(&challenge_id, &cook_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotParticipating)?;

        if entry.status == EntryStatus::Succeeded {
            tracing::debug!(
                "Cook {} re-submitted succeeded challenge {}",
                cook_id,
                challenge_id
            );
            return Ok(entry);
        }

        let now = Utc::now();
        let tx = self
            .db
            .transaction()
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        // In-progress status is re-validated at write time; a raced
        // submission falls through to the re-read below.
        let rows_affected = tx
            .execute(
                "UPDATE challenge_entries SET status = 'succeeded', session_id = ?2, completed_at = ?3
                 WHERE id = ?1 AND status = 'in_progress'",
                rusqlite::params![
                    entry.id.to_string(),
                    session_id.to_string(),
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        if rows_affected == 0 {
            drop(tx);
            let current = store
                .live_entry_for(&challenge_id, &cook_id)
                .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;
            return match current {
                Some(e) if e.status == EntryStatus::Succeeded => Ok(e),
                _ => Err(ChallengeError::NotParticipating),
            };
        }

        let credited = tx
            .execute(
                "UPDATE cooks SET experience = experience + ?2, updated_at = ?3 WHERE id = ?1",
                rusqlite::params![
                    cook_id.to_string(),
                    challenge.reward_xp,
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        if credited == 0 {
            // No cook row to credit; roll the status change back too.
            return Err(ChallengeError::DatabaseError(format!(
                "Cook profile missing for {}",
                cook_id
            )));
        }

        tx.commit()
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        tracing::info!(
            "Cook {} succeeded challenge {} (+{} XP)",
            cook_id,
            challenge_id,
            challenge.reward_xp
        );
        self.notify(ChangeEvent::ParticipationChanged {
            challenge_id,
            cook_id,
        });
        self.notify(ChangeEvent::ExperienceGranted {
            cook_id,
            amount: challenge.reward_xp,
        });

        Ok(ChallengeEntry {
            status: EntryStatus::Succeeded,
            session_id: Some(session_id),
            completed_at: Some(now),
            ..entry
        })
    }

    /// Abandon an in-progress entry.
    ///
    /// The abandoned record is kept as history; re-participating creates
    /// a fresh entry.
    pub fn abandon(
        &self,
        challenge_id: Uuid,
        cook_id: Uuid,
    ) -> Result<ChallengeEntry, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        let entry = store
            .live_entry_for(&challenge_id, &cook_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotParticipating)?;

        if entry.status == EntryStatus::Succeeded {
            return Err(ChallengeError::AlreadySucceeded);
        }

        let rows_affected = self
            .db
            .connection()
            .execute(
                "UPDATE challenge_entries SET status = 'abandoned'
                 WHERE id = ?1 AND status = 'in_progress'",
                rusqlite::params![entry.id.to_string()],
            )
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        if rows_affected == 0 {
            // Raced with a submission; the entry is no longer in progress.
            return Err(ChallengeError::AlreadySucceeded);
        }

        tracing::info!("Cook {} abandoned challenge {}", cook_id, challenge_id);
        self.notify(ChangeEvent::ParticipationChanged {
            challenge_id,
            cook_id,
        });

        Ok(ChallengeEntry {
            status: EntryStatus::Abandoned,
            ..entry
        })
    }

    /// The state a cook holds with respect to a challenge.
    pub fn participation_state(
        &self,
        challenge_id: Uuid,
        cook_id: Uuid,
    ) -> Result<ParticipationState, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        store
            .get_challenge(&challenge_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
            .ok_or(ChallengeError::NotFound(challenge_id))?;

        if let Some(entry) = store
            .live_entry_for(&challenge_id, &cook_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?
        {
            return Ok(match entry.status {
                EntryStatus::InProgress => ParticipationState::InProgress,
                EntryStatus::Succeeded => ParticipationState::Succeeded,
                EntryStatus::Abandoned => ParticipationState::Abandoned,
            });
        }

        let history = store
            .entries_for(&challenge_id, &cook_id)
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))?;

        if history.is_empty() {
            Ok(ParticipationState::NotParticipating)
        } else {
            Ok(ParticipationState::Abandoned)
        }
    }

    /// Get in-progress entries of a cook across open challenges.
    pub fn active_entries(
        &self,
        cook_id: Uuid,
    ) -> Result<Vec<(Challenge, ChallengeEntry)>, ChallengeError> {
        let store = ChallengeStore::new(self.db.connection());
        store
            .in_progress_for_cook(&cook_id, Utc::now())
            .map_err(|e| ChallengeError::DatabaseError(e.to_string()))
    }
}

/// Challenge errors.
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error("Challenge not found: {0}")]
    NotFound(Uuid),

    #[error("Club not found: {0}")]
    ClubNotFound(Uuid),

    #[error("Challenge window ends before it starts")]
    InvalidWindow,

    #[error("Challenge has ended")]
    Inactive,

    #[error("Already participating in this challenge")]
    AlreadyParticipating,

    #[error("Not participating in this challenge")]
    NotParticipating,

    #[error("Entry already succeeded")]
    AlreadySucceeded,

    #[error("Not the owner of club {0}")]
    NotClubOwner(Uuid),

    #[error("Club is not registered for this challenge")]
    NotRegistered,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
