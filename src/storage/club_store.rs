//! Club data storage operations.
//!
//! Provides persistence for:
//! - Clubs
//! - Memberships
//! - Join requests
//! - Club chat messages

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::clubs::types::{
    Club, ClubMembership, ClubMessage, ClubRole, ClubVisibility, JoinRequest, RequestStatus,
};
use crate::storage::cook_store::parse_timestamp;
use crate::storage::database::{map_sqlite_error, DatabaseError};

/// Store for persisting clubs, memberships, requests, and messages.
pub struct ClubStore<'a> {
    conn: &'a Connection,
}

impl<'a> ClubStore<'a> {
    /// Create a new club store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Club Operations ==========

    /// Insert a new club.
    pub fn insert_club(&self, club: &Club) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO clubs (id, name, description, visibility, owner_cook_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    club.id.to_string(),
                    club.name,
                    club.description,
                    club.visibility.as_str(),
                    club.owner_cook_id.to_string(),
                    club.created_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    /// Get a club by ID.
    pub fn get_club(&self, club_id: &Uuid) -> Result<Option<Club>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, description, visibility, owner_cook_id, created_at
                 FROM clubs WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![club_id.to_string()], |row| {
            Ok(ClubRow {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                visibility: row.get(3)?,
                owner_cook_id: row.get(4)?,
                created_at: row.get(5)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row.into_club()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Update a club's details.
    pub fn update_club(&self, club: &Club) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE clubs SET name = ?2, description = ?3, visibility = ?4 WHERE id = ?1",
                params![
                    club.id.to_string(),
                    club.name,
                    club.description,
                    club.visibility.as_str(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Club {}", club.id)));
        }

        Ok(())
    }

    /// Get clubs a cook belongs to.
    pub fn clubs_for_cook(&self, cook_id: &Uuid) -> Result<Vec<Club>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.id, c.name, c.description, c.visibility, c.owner_cook_id, c.created_at
                 FROM clubs c
                 JOIN club_members m ON c.id = m.club_id
                 WHERE m.cook_id = ?1
                 ORDER BY m.joined_at DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![cook_id.to_string()], |row| {
                Ok(ClubRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    visibility: row.get(3)?,
                    owner_cook_id: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut clubs = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            clubs.push(row.into_club()?);
        }

        Ok(clubs)
    }

    // ========== Membership Operations ==========

    /// Insert a membership.
    pub fn insert_membership(&self, membership: &ClubMembership) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO club_members (id, club_id, cook_id, role, joined_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    membership.id.to_string(),
                    membership.club_id.to_string(),
                    membership.cook_id.to_string(),
                    membership.role.as_str(),
                    membership.joined_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    /// Get the membership a cook holds in a club, if any.
    pub fn membership_for(
        &self,
        club_id: &Uuid,
        cook_id: &Uuid,
    ) -> Result<Option<ClubMembership>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, club_id, cook_id, role, joined_at
                 FROM club_members WHERE club_id = ?1 AND cook_id = ?2",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(
            params![club_id.to_string(), cook_id.to_string()],
            |row| {
                Ok(MembershipRow {
                    id: row.get(0)?,
                    club_id: row.get(1)?,
                    cook_id: row.get(2)?,
                    role: row.get(3)?,
                    joined_at: row.get(4)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_membership()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get all memberships of a club, owner first.
    pub fn members_of(&self, club_id: &Uuid) -> Result<Vec<ClubMembership>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, club_id, cook_id, role, joined_at
                 FROM club_members WHERE club_id = ?1
                 ORDER BY CASE role WHEN 'owner' THEN 0 WHEN 'admin' THEN 1 ELSE 2 END, joined_at",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![club_id.to_string()], |row| {
                Ok(MembershipRow {
                    id: row.get(0)?,
                    club_id: row.get(1)?,
                    cook_id: row.get(2)?,
                    role: row.get(3)?,
                    joined_at: row.get(4)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut members = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            members.push(row.into_membership()?);
        }

        Ok(members)
    }

    /// Count members of a club.
    pub fn count_members(&self, club_id: &Uuid) -> Result<u32, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM club_members WHERE club_id = ?1",
                params![club_id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as u32)
    }

    /// Update a member's role.
    pub fn update_member_role(
        &self,
        club_id: &Uuid,
        cook_id: &Uuid,
        role: ClubRole,
    ) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE club_members SET role = ?3 WHERE club_id = ?1 AND cook_id = ?2",
                params![club_id.to_string(), cook_id.to_string(), role.as_str()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Membership of {} in club {}",
                cook_id, club_id
            )));
        }

        Ok(())
    }

    /// Delete a membership. Returns the number of rows removed.
    pub fn delete_membership(
        &self,
        club_id: &Uuid,
        cook_id: &Uuid,
    ) -> Result<usize, DatabaseError> {
        self.conn
            .execute(
                "DELETE FROM club_members WHERE club_id = ?1 AND cook_id = ?2",
                params![club_id.to_string(), cook_id.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    // ========== Join Request Operations ==========

    /// Insert a join request.
    pub fn insert_request(&self, request: &JoinRequest) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO join_requests (id, club_id, cook_id, status, requested_at, decided_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    request.id.to_string(),
                    request.club_id.to_string(),
                    request.cook_id.to_string(),
                    request.status.as_str(),
                    request.requested_at.to_rfc3339(),
                    request.decided_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    /// Get a join request by ID.
    pub fn get_request(&self, request_id: &Uuid) -> Result<Option<JoinRequest>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, club_id, cook_id, status, requested_at, decided_at
                 FROM join_requests WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![request_id.to_string()], |row| {
            Ok(RequestRow {
                id: row.get(0)?,
                club_id: row.get(1)?,
                cook_id: row.get(2)?,
                status: row.get(3)?,
                requested_at: row.get(4)?,
                decided_at: row.get(5)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row.into_request()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get the most recent join request a cook made to a club, if any.
    pub fn latest_request_for(
        &self,
        club_id: &Uuid,
        cook_id: &Uuid,
    ) -> Result<Option<JoinRequest>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, club_id, cook_id, status, requested_at, decided_at
                 FROM join_requests WHERE club_id = ?1 AND cook_id = ?2
                 ORDER BY requested_at DESC LIMIT 1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(
            params![club_id.to_string(), cook_id.to_string()],
            |row| {
                Ok(RequestRow {
                    id: row.get(0)?,
                    club_id: row.get(1)?,
                    cook_id: row.get(2)?,
                    status: row.get(3)?,
                    requested_at: row.get(4)?,
                    decided_at: row.get(5)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_request()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get pending join requests for a club, oldest first.
    pub fn pending_requests(&self, club_id: &Uuid) -> Result<Vec<JoinRequest>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, club_id, cook_id, status, requested_at, decided_at
                 FROM join_requests WHERE club_id = ?1 AND status = 'pending'
                 ORDER BY requested_at ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![club_id.to_string()], |row| {
                Ok(RequestRow {
                    id: row.get(0)?,
                    club_id: row.get(1)?,
                    cook_id: row.get(2)?,
                    status: row.get(3)?,
                    requested_at: row.get(4)?,
                    decided_at: row.get(5)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut requests = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            requests.push(row.into_request()?);
        }

        Ok(requests)
    }

    /// Delete all join requests a cook made to a club. Returns rows removed.
    pub fn delete_requests_for(
        &self,
        club_id: &Uuid,
        cook_id: &Uuid,
    ) -> Result<usize, DatabaseError> {
        self.conn
            .execute(
                "DELETE FROM join_requests WHERE club_id = ?1 AND cook_id = ?2",
                params![club_id.to_string(), cook_id.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    // ========== Message Operations ==========

    /// Insert a chat message.
    pub fn insert_message(&self, message: &ClubMessage) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO club_messages (id, club_id, sender_cook_id, body, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.id.to_string(),
                    message.club_id.to_string(),
                    message.sender_cook_id.to_string(),
                    message.body,
                    message.sent_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    /// Get the most recent messages of a club, newest first.
    pub fn recent_messages(
        &self,
        club_id: &Uuid,
        limit: u32,
    ) -> Result<Vec<ClubMessage>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, club_id, sender_cook_id, body, sent_at
                 FROM club_messages WHERE club_id = ?1
                 ORDER BY sent_at DESC LIMIT ?2",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![club_id.to_string(), limit], |row| {
                Ok(MessageRow {
                    id: row.get(0)?,
                    club_id: row.get(1)?,
                    sender_cook_id: row.get(2)?,
                    body: row.get(3)?,
                    sent_at: row.get(4)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut messages = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            messages.push(row.into_message()?);
        }

        Ok(messages)
    }
}

/// Intermediate struct for reading club rows from the database.
struct ClubRow {
    id: String,
    name: String,
    description: Option<String>,
    visibility: String,
    owner_cook_id: String,
    created_at: String,
}

impl ClubRow {
    fn into_club(self) -> Result<Club, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let owner_cook_id = Uuid::parse_str(&self.owner_cook_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid owner UUID: {}", e))
        })?;

        let visibility = ClubVisibility::from_str(&self.visibility).ok_or_else(|| {
            DatabaseError::DeserializationError(format!("Unknown visibility: {}", self.visibility))
        })?;

        Ok(Club {
            id,
            name: self.name,
            description: self.description,
            visibility,
            owner_cook_id,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Intermediate struct for reading membership rows from the database.
struct MembershipRow {
    id: String,
    club_id: String,
    cook_id: String,
    role: String,
    joined_at: String,
}

impl MembershipRow {
    fn into_membership(self) -> Result<ClubMembership, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let club_id = Uuid::parse_str(&self.club_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid club UUID: {}", e))
        })?;

        let cook_id = Uuid::parse_str(&self.cook_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid cook UUID: {}", e))
        })?;

        let role = ClubRole::from_str(&self.role).ok_or_else(|| {
            DatabaseError::DeserializationError(format!("Unknown role: {}", self.role))
        })?;

        Ok(ClubMembership {
            id,
            club_id,
            cook_id,
            role,
            joined_at: parse_timestamp(&self.joined_at)?,
        })
    }
}

/// Intermediate struct for reading join request rows from the database.
struct RequestRow {
    id: String,
    club_id: String,
    cook_id: String,
    status: String,
    requested_at: String,
    decided_at: Option<String>,
}

impl RequestRow {
    fn into_request(self) -> Result<JoinRequest, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let club_id = Uuid::parse_str(&self.club_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid club UUID: {}", e))
        })?;

        let cook_id = Uuid::parse_str(&self.cook_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid cook UUID: {}", e))
        })?;

        let status = RequestStatus::from_str(&self.status).ok_or_else(|| {
            DatabaseError::DeserializationError(format!("Unknown status: {}", self.status))
        })?;

        let decided_at = self
            .decided_at
            .map(|s| parse_timestamp(&s))
            .transpose()?;

        Ok(JoinRequest {
            id,
            club_id,
            cook_id,
            status,
            requested_at: parse_timestamp(&self.requested_at)?,
            decided_at,
        })
    }
}

/// Intermediate struct for reading message rows from the database.
struct MessageRow {
    id: String,
    club_id: String,
    sender_cook_id: String,
    body: String,
    sent_at: String,
}

impl MessageRow {
    fn into_message(self) -> Result<ClubMessage, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let club_id = Uuid::parse_str(&self.club_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid club UUID: {}", e))
        })?;

        let sender_cook_id = Uuid::parse_str(&self.sender_cook_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid sender UUID: {}", e))
        })?;

        Ok(ClubMessage {
            id,
            club_id,
            sender_cook_id,
            body: self.body,
            sent_at: parse_timestamp(&self.sent_at)?,
        })
    }
}
