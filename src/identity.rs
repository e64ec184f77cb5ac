//! Identity collaborator.
//!
//! Exposes who the current cook is. The domain managers take acting cook
//! ids as explicit parameters; callers resolve them through this seam so
//! nothing in the core reaches out to ambient global state.

use std::sync::Arc;
use uuid::Uuid;

use crate::storage::{CookStore, Database};

/// Source of the currently signed-in cook's identity.
pub trait Identity {
    /// The id of the current cook.
    fn current_cook_id(&self) -> Result<Uuid, IdentityError>;
}

/// Local single-profile session: the earliest-created cook is the
/// signed-in one, created on first use.
pub struct LocalSession {
    db: Arc<Database>,
}

impl LocalSession {
    /// Create a new local session.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl Identity for LocalSession {
    fn current_cook_id(&self) -> Result<Uuid, IdentityError> {
        let store = CookStore::new(self.db.connection());

        if let Some(cook) = store
            .first_cook()
            .map_err(|e| IdentityError::DatabaseError(e.to_string()))?
        {
            return Ok(cook.id);
        }

        let cook = store
            .get_or_create_cook(&Uuid::new_v4())
            .map_err(|e| IdentityError::DatabaseError(e.to_string()))?;

        tracing::info!("Created local cook profile {}", cook.id);
        Ok(cook.id)
    }
}

/// Identity errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}
