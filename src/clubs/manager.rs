//! Club management.
//!
//! Governs club creation, membership transitions, roles, chat, and the
//! deletion cascade. Joining is direct for public clubs; private clubs go
//! through the join-request flow moderated in [`super::moderation`].

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::types::{
    Club, ClubMembership, ClubMessage, ClubRole, ClubVisibility, JoinRequest, MembershipState,
    RequestStatus,
};
use crate::events::{ChangeEvent, ChangeFeed};
use crate::storage::{ClubStore, Database, DatabaseError};

/// Club manager.
pub struct ClubManager {
    db: Arc<Database>,
    feed: Option<Arc<ChangeFeed>>,
}

impl ClubManager {
    /// Create a new club manager.
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

    /// Create a new club. The creator becomes its owner.
    pub fn create_club(
        &self,
        name: String,
        description: Option<String>,
        visibility: ClubVisibility,
        owner_id: Uuid,
    ) -> Result<Club, ClubError> {
        let now = Utc::now();
        let club = Club {
            id: Uuid::new_v4(),
            name,
            description,
            visibility,
            owner_cook_id: owner_id,
            created_at: now,
        };
        let membership = ClubMembership {
            id: Uuid::new_v4(),
            club_id: club.id,
            cook_id: owner_id,
            role: ClubRole::Owner,
            joined_at: now,
        };

        // Club and owner membership are born together.
        let tx = self
            .db
            .transaction()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        {
            let store = ClubStore::new(&tx);
            store
                .insert_club(&club)
                .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
            store
                .insert_membership(&membership)
                .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        tracing::info!("Cook {} created club {} ({})", owner_id, club.id, club.name);
        self.notify(ChangeEvent::MembershipChanged {
            club_id: club.id,
            cook_id: owner_id,
        });

        Ok(club)
    }

    /// Get a club by ID.
    pub fn get_club(&self, club_id: Uuid) -> Result<Club, ClubError> {
        let store = ClubStore::new(self.db.connection());
        store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))
    }

    /// Get clubs a cook belongs to.
    pub fn clubs_for_cook(&self, cook_id: Uuid) -> Result<Vec<Club>, ClubError> {
        let store = ClubStore::new(self.db.connection());
        store
            .clubs_for_cook(&cook_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))
    }

    /// Join a public club directly.
    pub fn join_club(&self, club_id: Uuid, cook_id: Uuid) -> Result<ClubMembership, ClubError> {
        let store = ClubStore::new(self.db.connection());
        let club = store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        if store
            .membership_for(&club_id, &cook_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .is_some()
        {
            return Err(ClubError::AlreadyMember);
        }

        if club.visibility != ClubVisibility::Public {
            return Err(ClubError::PrivateClub);
        }

        let membership = ClubMembership {
            id: Uuid::new_v4(),
            club_id,
            cook_id,
            role: ClubRole::Member,
            joined_at: Utc::now(),
        };

        let tx = self
            .db
            .transaction()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        {
            let store = ClubStore::new(&tx);
            // Clear any stale request residue for the pair.
            store
                .delete_requests_for(&club_id, &cook_id)
                .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
            match store.insert_membership(&membership) {
                // A concurrent join won the unique constraint race.
                Err(DatabaseError::ConstraintViolation(_)) => {
                    return Err(ClubError::AlreadyMember)
                }
                other => other.map_err(|e| ClubError::DatabaseError(e.to_string()))?,
            }
        }
        tx.commit()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        tracing::info!("Cook {} joined club {}", cook_id, club_id);
        self.notify(ChangeEvent::MembershipChanged { club_id, cook_id });

        Ok(membership)
    }

    /// Request to join a private club.
    pub fn request_to_join(&self, club_id: Uuid, cook_id: Uuid) -> Result<JoinRequest, ClubError> {
        let store = ClubStore::new(self.db.connection());
        let club = store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        if club.visibility != ClubVisibility::Private {
            return Err(ClubError::PublicClub);
        }

        if store
            .membership_for(&club_id, &cook_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .is_some()
        {
            return Err(ClubError::AlreadyMember);
        }

        match store
            .latest_request_for(&club_id, &cook_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
        {
            Some(request) if request.status == RequestStatus::Pending => {
                return Err(ClubError::DuplicateRequest)
            }
            Some(request) if request.status == RequestStatus::Rejected => {
                tracing::warn!(
                    "Cook {} re-requested club {} after rejection",
                    cook_id,
                    club_id
                );
                return Err(ClubError::RequestRejected);
            }
            _ => {}
        }

        let request = JoinRequest {
            id: Uuid::new_v4(),
            club_id,
            cook_id,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            decided_at: None,
        };

        match store.insert_request(&request) {
            // A concurrent request won the pending-uniqueness race.
            Err(DatabaseError::ConstraintViolation(_)) => {
                return Err(ClubError::DuplicateRequest)
            }
            other => other.map_err(|e| ClubError::DatabaseError(e.to_string()))?,
        }

        tracing::info!("Cook {} requested to join club {}", cook_id, club_id);
        self.notify(ChangeEvent::MembershipChanged { club_id, cook_id });

        Ok(request)
    }

    /// The state a cook holds with respect to a club.
    pub fn membership_state(
        &self,
        club_id: Uuid,
        cook_id: Uuid,
    ) -> Result<MembershipState, ClubError> {
        let store = ClubStore::new(self.db.connection());
        store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        if let Some(membership) = store
            .membership_for(&club_id, &cook_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
        {
            return Ok(membership.role.into());
        }

        match store
            .latest_request_for(&club_id, &cook_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
        {
            Some(request) if request.status == RequestStatus::Pending => {
                Ok(MembershipState::Pending)
            }
            Some(request) if request.status == RequestStatus::Rejected => {
                Ok(MembershipState::Rejected)
            }
            _ => Ok(MembershipState::NonMember),
        }
    }

    /// Leave a club. The owner cannot leave.
    pub fn leave_club(&self, club_id: Uuid, cook_id: Uuid) -> Result<(), ClubError> {
        let store = ClubStore::new(self.db.connection());
        let membership = store
            .membership_for(&club_id, &cook_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotMember)?;

        if membership.role == ClubRole::Owner {
            tracing::warn!("Owner {} attempted to leave club {}", cook_id, club_id);
            return Err(ClubError::ForbiddenForOwner);
        }

        let tx = self
            .db
            .transaction()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        {
            let store = ClubStore::new(&tx);
            store
                .delete_membership(&club_id, &cook_id)
                .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
            // Leaving also clears request residue for the pair.
            store
                .delete_requests_for(&club_id, &cook_id)
                .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        tracing::info!("Cook {} left club {}", cook_id, club_id);
        self.notify(ChangeEvent::MembershipChanged { club_id, cook_id });

        Ok(())
    }

    /// Remove a member from a club. Owner or admin only.
    ///
    /// The owner cannot be removed; only club deletion ends an ownership.
    pub fn remove_member(
        &self,
        club_id: Uuid,
        target_id: Uuid,
        acting_id: Uuid,
    ) -> Result<(), ClubError> {
        let store = ClubStore::new(self.db.connection());
        store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        let acting = store
            .membership_for(&club_id, &acting_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        let authorized = matches!(
            acting.map(|m| m.role),
            Some(ClubRole::Owner) | Some(ClubRole::Admin)
        );
        if !authorized {
            return Err(ClubError::NotAuthorized);
        }

        let target = store
            .membership_for(&club_id, &target_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotMember)?;

        if target.role == ClubRole::Owner {
            tracing::warn!(
                "Cook {} attempted to remove the owner of club {}",
                acting_id,
                club_id
            );
            return Err(ClubError::ForbiddenForOwner);
        }

        let tx = self
            .db
            .transaction()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        {
            let store = ClubStore::new(&tx);
            store
                .delete_membership(&club_id, &target_id)
                .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
            store
                .delete_requests_for(&club_id, &target_id)
                .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        tracing::info!(
            "Cook {} removed {} from club {}",
            acting_id,
            target_id,
            club_id
        );
        self.notify(ChangeEvent::MembershipChanged {
            club_id,
            cook_id: target_id,
        });

        Ok(())
    }

    /// Promote a member to admin or demote an admin to member.
    ///
    /// Owner-only. The owner's own row cannot be touched, and ownership
    /// cannot be granted here.
    pub fn set_member_role(
        &self,
        club_id: Uuid,
        target_id: Uuid,
        role: ClubRole,
        acting_id: Uuid,
    ) -> Result<(), ClubError> {
        let store = ClubStore::new(self.db.connection());
        let club = store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        if club.owner_cook_id != acting_id {
            return Err(ClubError::NotAuthorized);
        }

        if role == ClubRole::Owner {
            return Err(ClubError::ForbiddenForOwner);
        }

        let membership = store
            .membership_for(&club_id, &target_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotMember)?;

        if membership.role == ClubRole::Owner {
            return Err(ClubError::ForbiddenForOwner);
        }

        store
            .update_member_role(&club_id, &target_id, role)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        tracing::info!(
            "Cook {} set role of {} in club {} to {}",
            acting_id,
            target_id,
            club_id,
            role.as_str()
        );
        self.notify(ChangeEvent::MembershipChanged {
            club_id,
            cook_id: target_id,
        });

        Ok(())
    }

    /// Update a club's details. Owner or admin only.
    pub fn update_details(
        &self,
        club_id: Uuid,
        name: String,
        description: Option<String>,
        visibility: ClubVisibility,
        acting_id: Uuid,
    ) -> Result<Club, ClubError> {
        let store = ClubStore::new(self.db.connection());
        let club = store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        let membership = store
            .membership_for(&club_id, &acting_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;
        let authorized = matches!(
            membership.map(|m| m.role),
            Some(ClubRole::Owner) | Some(ClubRole::Admin)
        );
        if !authorized {
            return Err(ClubError::NotAuthorized);
        }

        let updated = Club {
            name,
            description,
            visibility,
            ..club
        };

        store
            .update_club(&updated)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        Ok(updated)
    }

    /// Get all memberships of a club, owner first.
    pub fn members(&self, club_id: Uuid) -> Result<Vec<ClubMembership>, ClubError> {
        let store = ClubStore::new(self.db.connection());
        store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        store
            .members_of(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))
    }

    /// Count members of a club.
    pub fn member_count(&self, club_id: Uuid) -> Result<u32, ClubError> {
        let store = ClubStore::new(self.db.connection());
        store
            .count_members(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))
    }

    /// Post a chat message to a club. Members only.
    pub fn post_message(
        &self,
        club_id: Uuid,
        sender_id: Uuid,
        body: String,
    ) -> Result<ClubMessage, ClubError> {
        let body = body.trim().to_string();
        if body.is_empty() {
            return Err(ClubError::EmptyMessage);
        }

        let store = ClubStore::new(self.db.connection());
        store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        if store
            .membership_for(&club_id, &sender_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .is_none()
        {
            return Err(ClubError::NotMember);
        }

        let message = ClubMessage {
            id: Uuid::new_v4(),
            club_id,
            sender_cook_id: sender_id,
            body,
            sent_at: Utc::now(),
        };

        store
            .insert_message(&message)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        self.notify(ChangeEvent::MessagePosted { club_id });

        Ok(message)
    }

    /// Get the most recent messages of a club, newest first.
    pub fn recent_messages(
        &self,
        club_id: Uuid,
        limit: u32,
    ) -> Result<Vec<ClubMessage>, ClubError> {
        let store = ClubStore::new(self.db.connection());
        store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        store
            .recent_messages(&club_id, limit)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))
    }

    /// Delete a club and everything attached to it. Owner only.
    ///
    /// The cascade runs as one transaction: if any step fails, nothing is
    /// deleted and the club remains intact.
    pub fn delete_club(&self, club_id: Uuid, acting_id: Uuid) -> Result<(), ClubError> {
        let store = ClubStore::new(self.db.connection());
        let club = store
            .get_club(&club_id)
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?
            .ok_or(ClubError::NotFound(club_id))?;

        if club.owner_cook_id != acting_id {
            tracing::warn!(
                "Cook {} attempted to delete club {} without owning it",
                acting_id,
                club_id
            );
            return Err(ClubError::NotAuthorized);
        }

        let tx = self
            .db
            .transaction()
            .map_err(|e| ClubError::DatabaseError(e.to_string()))?;

        let club_id_str = club_id.to_string();
        tx.execute(
            "DELETE FROM club_challenge_entries WHERE club_id = ?1",
            [&club_id_str],
        )
        .map_err(|e| ClubError::DeletionFailed(e.to_string()))?;
        tx.execute(
            "DELETE FROM club_messages WHERE club_id = ?1",
            [&club_id_str],
        )
        .map_err(|e| ClubError::DeletionFailed(e.to_string()))?;
        tx.execute(
            "DELETE FROM join_requests WHERE club_id = ?1",
            [&club_id_str],
        )
        .map_err(|e| ClubError::DeletionFailed(e.to_string()))?;
        tx.execute(
            "DELETE FROM club_members WHERE club_id = ?1",
            [&club_id_str],
        )
        .map_err(|e| ClubError::DeletionFailed(e.to_string()))?;
        tx.execute("DELETE FROM clubs WHERE id = ?1", [&club_id_str])
            .map_err(|e| ClubError::DeletionFailed(e.to_string()))?;

        tx.commit()
            .map_err(|e| ClubError::DeletionFailed(e.to_string()))?;

        tracing::info!("Cook {} deleted club {} ({})", acting_id, club_id, club.name);
        self.notify(ChangeEvent::ClubDeleted { club_id });

        Ok(())
    }
}

/// Club errors.
#[derive(Debug, thiserror::Error)]
pub enum ClubError {
    #[error("Club not found: {0}")]
    NotFound(Uuid),

    #[error("Club is private; joining requires an approved request")]
    PrivateClub,

    #[error("Club is public; join it directly")]
    PublicClub,

    #[error("Already a member")]
    AlreadyMember,

    #[error("A request is already pending")]
    DuplicateRequest,

    #[error("A previous request was rejected")]
    RequestRejected,

    #[error("Not a member")]
    NotMember,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("The owner cannot leave or be reassigned")]
    ForbiddenForOwner,

    #[error("Message body is empty")]
    EmptyMessage,

    #[error("Deletion could not complete: {0}")]
    DeletionFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
