//! Join-request moderation.
//!
//! Owner-only review of pending join requests. Decisions are terminal:
//! a request only ever moves pending→approved or pending→rejected.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::types::{ClubMembership, ClubRole, JoinRequest, RequestStatus};
use crate::events::{ChangeEvent, ChangeFeed};
use crate::storage::{ClubStore, Database};

/// A moderation decision on a pending join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Moderation queue for a club owner.
pub struct ModerationQueue {
    db: Arc<Database>,
    feed: Option<Arc<ChangeFeed>>,
}

impl ModerationQueue {
    /// Create a new moderation queue.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db, feed: None }
    }

    /// Attach a change feed that receives an event after each decision.
    pub fn with_feed(mut self, feed: Arc<ChangeFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    fn notify(&self, event: ChangeEvent) {
        if let Some(feed) = &self.feed {
            feed.publish(event);
        }
    }

    /// List pending requests for a club, oldest first. Owner only.
    pub fn pending_requests(
        &self,
        club_id: Uuid,
        acting_id: Uuid,
    ) -> Result<Vec<JoinRequest>, ModerationError> {
        let store = ClubStore::new(self.db.connection());
        let club = store
            .get_club(&club_id)
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))?
            .ok_or(ModerationError::NotFound(club_id))?;

        if club.owner_cook_id != acting_id {
            return Err(ModerationError::NotAuthorized);
        }

        store
            .pending_requests(&club_id)
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))
    }

    /// Decide a pending request. Owner only.
    ///
    /// Pending status is re-validated at write time, so of two racing
    /// decisions exactly one changes state; the other observes
    /// [`ModerationError::AlreadyDecided`]. Approval inserts the member
    /// row in the same transaction as the status change.
    pub fn decide(
        &self,
        request_id: Uuid,
        decision: Decision,
        acting_id: Uuid,
    ) -> Result<RequestStatus, ModerationError> {
        let store = ClubStore::new(self.db.connection());
        let request = store
            .get_request(&request_id)
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))?
            .ok_or(ModerationError::NotFound(request_id))?;

        let club = store
            .get_club(&request.club_id)
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))?
            .ok_or(ModerationError::NotFound(request.club_id))?;

        if club.owner_cook_id != acting_id {
            return Err(ModerationError::NotAuthorized);
        }

        let new_status = match decision {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        };
        let now = Utc::now();

        let tx = self
            .db
            .transaction()
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))?;

        let rows_affected = tx
            .execute(
                "UPDATE join_requests SET status = ?2, decided_at = ?3
                 WHERE id = ?1 AND status = 'pending'",
                rusqlite::params![
                    request_id.to_string(),
                    new_status.as_str(),
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))?;

        if rows_affected == 0 {
            // Someone else decided first; leave their decision alone.
            return Err(ModerationError::AlreadyDecided);
        }

        if decision == Decision::Approve {
            let membership = ClubMembership {
                id: Uuid::new_v4(),
                club_id: request.club_id,
                cook_id: request.cook_id,
                role: ClubRole::Member,
                joined_at: now,
            };
            // The requester may have slipped in through a visibility
            // change; an existing membership stands.
            tx.execute(
                "INSERT OR IGNORE INTO club_members (id, club_id, cook_id, role, joined_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    membership.id.to_string(),
                    membership.club_id.to_string(),
                    membership.cook_id.to_string(),
                    membership.role.as_str(),
                    membership.joined_at.to_rfc3339(),
                ],
            )
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| ModerationError::DatabaseError(e.to_string()))?;

        tracing::info!(
            "Owner {} {} request {} from cook {} for club {}",
            acting_id,
            match decision {
                Decision::Approve => "approved",
                Decision::Reject => "rejected",
            },
            request_id,
            request.cook_id,
            request.club_id
        );

        self.notify(ChangeEvent::RequestDecided {
            club_id: request.club_id,
            cook_id: request.cook_id,
            approved: decision == Decision::Approve,
        });
        if decision == Decision::Approve {
            self.notify(ChangeEvent::MembershipChanged {
                club_id: request.club_id,
                cook_id: request.cook_id,
            });
        }

        Ok(new_status)
    }
}

/// Moderation errors.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Not found: {0}")]
    NotFound(Uuid),

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Request already decided")]
    AlreadyDecided,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
