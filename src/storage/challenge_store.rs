//! Challenge data storage operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::challenges::types::{Challenge, ChallengeEntry, ClubChallengeEntry, EntryStatus};
use crate::storage::cook_store::parse_timestamp;
use crate::storage::database::{map_sqlite_error, DatabaseError};

/// Store for persisting challenges and participation entries.
pub struct ChallengeStore<'a> {
    conn: &'a Connection,
}

impl<'a> ChallengeStore<'a> {
    /// Create a new challenge store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Challenge Operations ==========

    /// Insert a new challenge.
    pub fn insert_challenge(&self, challenge: &Challenge) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO challenges (id, title, description, starts_at, ends_at, reward_xp, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    challenge.id.to_string(),
                    challenge.title,
                    challenge.description,
                    challenge.starts_at.to_rfc3339(),
                    challenge.ends_at.to_rfc3339(),
                    challenge.reward_xp,
                    challenge.created_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    /// Get a challenge by ID.
    pub fn get_challenge(&self, challenge_id: &Uuid) -> Result<Option<Challenge>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, description, starts_at, ends_at, reward_xp, created_at
                 FROM challenges WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![challenge_id.to_string()], |row| {
            Ok(ChallengeRow {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                starts_at: row.get(3)?,
                ends_at: row.get(4)?,
                reward_xp: row.get(5)?,
                created_at: row.get(6)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row.into_challenge()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get challenges whose window is still open at the given instant.
    pub fn open_challenges(&self, now: DateTime<Utc>) -> Result<Vec<Challenge>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, description, starts_at, ends_at, reward_xp, created_at
                 FROM challenges WHERE ends_at > ?1
                 ORDER BY ends_at ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![now.to_rfc3339()], |row| {
                Ok(ChallengeRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    starts_at: row.get(3)?,
                    ends_at: row.get(4)?,
                    reward_xp: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut challenges = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            challenges.push(row.into_challenge()?);
        }

        Ok(challenges)
    }

    // ========== Entry Operations ==========

    /// Insert a participation entry.
    pub fn insert_entry(&self, entry: &ChallengeEntry) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO challenge_entries (id, challenge_id, cook_id, status, session_id, started_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.id.to_string(),
                    entry.challenge_id.to_string(),
                    entry.cook_id.to_string(),
                    entry.status.as_str(),
                    entry.session_id.map(|id| id.to_string()),
                    entry.started_at.to_rfc3339(),
                    entry.completed_at.map(|dt| dt.to_rfc3339()),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    /// Get the live (not abandoned) entry of a cook for a challenge, if any.
    pub fn live_entry_for(
        &self,
        challenge_id: &Uuid,
        cook_id: &Uuid,
    ) -> Result<Option<ChallengeEntry>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, challenge_id, cook_id, status, session_id, started_at, completed_at
                 FROM challenge_entries
                 WHERE challenge_id = ?1 AND cook_id = ?2 AND status != 'abandoned'",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(
            params![challenge_id.to_string(), cook_id.to_string()],
            |row| {
                Ok(EntryRow {
                    id: row.get(0)?,
                    challenge_id: row.get(1)?,
                    cook_id: row.get(2)?,
                    status: row.get(3)?,
                    session_id: row.get(4)?,
                    started_at: row.get(5)?,
                    completed_at: row.get(6)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_entry()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get a cook's entry history for a challenge, newest first.
    pub fn entries_for(
        &self,
        challenge_id: &Uuid,
        cook_id: &Uuid,
    ) -> Result<Vec<ChallengeEntry>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, challenge_id, cook_id, status, session_id, started_at, completed_at
                 FROM challenge_entries
                 WHERE challenge_id = ?1 AND cook_id = ?2
                 ORDER BY started_at DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![challenge_id.to_string(), cook_id.to_string()],
                |row| {
                    Ok(EntryRow {
                        id: row.get(0)?,
                        challenge_id: row.get(1)?,
                        cook_id: row.get(2)?,
                        status: row.get(3)?,
                        session_id: row.get(4)?,
                        started_at: row.get(5)?,
                        completed_at: row.get(6)?,
                    })
                },
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            entries.push(row.into_entry()?);
        }

        Ok(entries)
    }

    /// Get in-progress entries of a cook across open challenges.
    pub fn in_progress_for_cook(
        &self,
        cook_id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Challenge, ChallengeEntry)>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.id FROM challenges c
                 JOIN challenge_entries e ON c.id = e.challenge_id
                 WHERE e.cook_id = ?1 AND e.status = 'in_progress' AND c.ends_at > ?2
                 ORDER BY c.ends_at",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![cook_id.to_string(), now.to_rfc3339()], |row| {
                row.get::<_, String>(0)
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            let id_str = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            let challenge_id = Uuid::parse_str(&id_str)
                .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;
            let challenge = self.get_challenge(&challenge_id)?.ok_or_else(|| {
                DatabaseError::NotFound(format!("Challenge {}", challenge_id))
            })?;
            let entry = self.live_entry_for(&challenge_id, cook_id)?.ok_or_else(|| {
                DatabaseError::NotFound(format!("Entry for challenge {}", challenge_id))
            })?;
            results.push((challenge, entry));
        }

        Ok(results)
    }

    // ========== Club Entry Operations ==========

    /// Insert a club registration for a challenge.
    pub fn insert_club_entry(&self, entry: &ClubChallengeEntry) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO club_challenge_entries (id, challenge_id, club_id, registered_by, registered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.id.to_string(),
                    entry.challenge_id.to_string(),
                    entry.club_id.to_string(),
                    entry.registered_by.to_string(),
                    entry.registered_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_error)?;
        Ok(())
    }

    /// Check whether a club is registered for a challenge.
    pub fn is_club_registered(
        &self,
        challenge_id: &Uuid,
        club_id: &Uuid,
    ) -> Result<bool, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id FROM club_challenge_entries WHERE challenge_id = ?1 AND club_id = ?2",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        stmt.exists(params![challenge_id.to_string(), club_id.to_string()])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    /// Get all club registrations for a challenge.
    pub fn club_entries_for(
        &self,
        challenge_id: &Uuid,
    ) -> Result<Vec<ClubChallengeEntry>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, challenge_id, club_id, registered_by, registered_at
                 FROM club_challenge_entries WHERE challenge_id = ?1
                 ORDER BY registered_at ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![challenge_id.to_string()], |row| {
                Ok(ClubEntryRow {
                    id: row.get(0)?,
                    challenge_id: row.get(1)?,
                    club_id: row.get(2)?,
                    registered_by: row.get(3)?,
                    registered_at: row.get(4)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            entries.push(row.into_club_entry()?);
        }

        Ok(entries)
    }

    /// Remove a club registration. Returns the number of rows removed.
    pub fn delete_club_entry(
        &self,
        challenge_id: &Uuid,
        club_id: &Uuid,
    ) -> Result<usize, DatabaseError> {
        self.conn
            .execute(
                "DELETE FROM club_challenge_entries WHERE challenge_id = ?1 AND club_id = ?2",
                params![challenge_id.to_string(), club_id.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }
}

/// Intermediate struct for reading challenge rows from the database.
struct ChallengeRow {
    id: String,
    title: String,
    description: Option<String>,
    starts_at: String,
    ends_at: String,
    reward_xp: u32,
    created_at: String,
}

impl ChallengeRow {
    fn into_challenge(self) -> Result<Challenge, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        Ok(Challenge {
            id,
            title: self.title,
            description: self.description,
            starts_at: parse_timestamp(&self.starts_at)?,
            ends_at: parse_timestamp(&self.ends_at)?,
            reward_xp: self.reward_xp,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Intermediate struct for reading entry rows from the database.
struct EntryRow {
    id: String,
    challenge_id: String,
    cook_id: String,
    status: String,
    session_id: Option<String>,
    started_at: String,
    completed_at: Option<String>,
}

impl EntryRow {
    fn into_entry(self) -> Result<ChallengeEntry, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let challenge_id = Uuid::parse_str(&self.challenge_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid challenge UUID: {}", e))
        })?;

        let cook_id = Uuid::parse_str(&self.cook_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid cook UUID: {}", e))
        })?;

        let status = EntryStatus::from_str(&self.status).ok_or_else(|| {
            DatabaseError::DeserializationError(format!("Unknown status: {}", self.status))
        })?;

        let session_id = self
            .session_id
            .map(|s| Uuid::parse_str(&s))
            .transpose()
            .map_err(|e| {
                DatabaseError::DeserializationError(format!("Invalid session UUID: {}", e))
            })?;

        let completed_at = self
            .completed_at
            .map(|s| parse_timestamp(&s))
            .transpose()?;

        Ok(ChallengeEntry {
            id,
            challenge_id,
            cook_id,
            status,
            session_id,
            started_at: parse_timestamp(&self.started_at)?,
            completed_at,
        })
    }
}

/// Intermediate struct for reading club entry rows from the database.
struct ClubEntryRow {
    id: String,
    challenge_id: String,
    club_id: String,
    registered_by: String,
    registered_at: String,
}

impl ClubEntryRow {
    fn into_club_entry(self) -> Result<ClubChallengeEntry, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let challenge_id = Uuid::parse_str(&self.challenge_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid challenge UUID: {}", e))
        })?;

        let club_id = Uuid::parse_str(&self.club_id).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid club UUID: {}", e))
        })?;

        let registered_by = Uuid::parse_str(&self.registered_by).map_err(|e| {
            DatabaseError::DeserializationError(format!("Invalid cook UUID: {}", e))
        })?;

        Ok(ClubChallengeEntry {
            id,
            challenge_id,
            club_id,
            registered_by,
            registered_at: parse_timestamp(&self.registered_at)?,
        })
    }
}
