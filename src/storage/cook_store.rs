//! Cook profile storage operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::cooks::types::CookProfile;
use crate::storage::database::{map_sqlite_error, DatabaseError};

/// Store for persisting cook profiles.
pub struct CookStore<'a> {
    conn: &'a Connection,
}

impl<'a> CookStore<'a> {
    /// Create a new cook store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Get a cook by ID.
    pub fn get_cook(&self, cook_id: &Uuid) -> Result<Option<CookProfile>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, display_name, avatar_id, bio, experience, onboarding_completed,
                        created_at, updated_at
                 FROM cooks WHERE id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let result = stmt.query_row(params![cook_id.to_string()], |row| {
            Ok(CookRow {
                id: row.get(0)?,
                display_name: row.get(1)?,
                avatar_id: row.get(2)?,
                bio: row.get(3)?,
                experience: row.get(4)?,
                onboarding_completed: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            })
        });

        match result {
            Ok(row) => Ok(Some(row.into_cook()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Get the earliest-created cook, if any.
    pub fn first_cook(&self) -> Result<Option<CookProfile>, DatabaseError> {
        let result: Result<String, _> = self.conn.query_row(
            "SELECT id FROM cooks ORDER BY created_at ASC LIMIT 1",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(id_str) => {
                let id = Uuid::parse_str(&id_str).map_err(|e| {
                    DatabaseError::DeserializationError(format!("Invalid UUID: {}", e))
                })?;
                self.get_cook(&id)
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Insert a new cook.
    pub fn insert_cook(&self, cook: &CookProfile) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO cooks (id, display_name, avatar_id, bio, experience,
                                    onboarding_completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    cook.id.to_string(),
                    cook.display_name,
                    cook.avatar_id,
                    cook.bio,
                    cook.experience,
                    cook.onboarding_completed as i32,
                    cook.created_at.to_rfc3339(),
                    cook.updated_at.to_rfc3339(),
                ],
            )
            .map_err(map_sqlite_error)?;

        Ok(())
    }

    /// Update an existing cook profile.
    pub fn update_cook(&self, cook: &CookProfile) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE cooks SET display_name = ?2, avatar_id = ?3, bio = ?4, experience = ?5,
                                  onboarding_completed = ?6, updated_at = ?7
                 WHERE id = ?1",
                params![
                    cook.id.to_string(),
                    cook.display_name,
                    cook.avatar_id,
                    cook.bio,
                    cook.experience,
                    cook.onboarding_completed as i32,
                    cook.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Cook {}", cook.id)));
        }

        Ok(())
    }

    /// Get or create a cook profile with default values.
    pub fn get_or_create_cook(&self, cook_id: &Uuid) -> Result<CookProfile, DatabaseError> {
        if let Some(cook) = self.get_cook(cook_id)? {
            return Ok(cook);
        }

        let cook = CookProfile::new(
            *cook_id,
            format!("Cook{}", &cook_id.to_string()[..4]),
        );
        self.insert_cook(&cook)?;
        Ok(cook)
    }
}

/// Intermediate struct for reading cook rows from the database.
struct CookRow {
    id: String,
    display_name: String,
    avatar_id: Option<String>,
    bio: Option<String>,
    experience: u32,
    onboarding_completed: i32,
    created_at: String,
    updated_at: String,
}

impl CookRow {
    fn into_cook(self) -> Result<CookProfile, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let created_at = parse_timestamp(&self.created_at)?;
        let updated_at = parse_timestamp(&self.updated_at)?;

        Ok(CookProfile {
            id,
            display_name: self.display_name,
            avatar_id: self.avatar_id,
            bio: self.bio,
            experience: self.experience,
            onboarding_completed: self.onboarding_completed != 0,
            created_at,
            updated_at,
        })
    }
}

/// Parse an RFC 3339 timestamp stored as TEXT.
pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))
}
