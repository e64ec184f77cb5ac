//! Cook profile management.
//!
//! Provides profile creation, updates, onboarding completion, and the
//! derived progression view.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::types::{CookProfile, CookProgress};
use crate::progression::LevelLadder;
use crate::storage::{CookStore, Database};

/// Profile manager for cook profiles.
pub struct ProfileManager {
    db: Arc<Database>,
}

impl ProfileManager {
    /// Create a new profile manager.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get or create a cook profile.
    pub fn get_or_create_profile(&self, cook_id: &Uuid) -> Result<CookProfile, ProfileError> {
        let store = CookStore::new(self.db.connection());
        store
            .get_or_create_cook(cook_id)
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))
    }

    /// Update a cook's display fields.
    ///
    /// Experience and the onboarding flag are deliberately not writable
    /// here; experience only changes through challenge completion.
    pub fn update_profile(&self, profile: &CookProfile) -> Result<(), ProfileError> {
        if !CookProfile::validate_display_name(&profile.display_name) {
            return Err(ProfileError::InvalidDisplayName);
        }

        let store = CookStore::new(self.db.connection());
        let existing = store
            .get_cook(&profile.id)
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?
            .ok_or(ProfileError::NotFound(profile.id))?;

        let updated = CookProfile {
            display_name: profile.display_name.clone(),
            avatar_id: profile.avatar_id.clone(),
            bio: profile.bio.clone(),
            updated_at: Utc::now(),
            ..existing
        };

        store
            .update_cook(&updated)
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Mark the onboarding flow as completed.
    pub fn complete_onboarding(&self, cook_id: &Uuid) -> Result<(), ProfileError> {
        let store = CookStore::new(self.db.connection());
        let mut cook = store
            .get_cook(cook_id)
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?
            .ok_or(ProfileError::NotFound(*cook_id))?;

        if cook.onboarding_completed {
            return Ok(());
        }

        cook.onboarding_completed = true;
        cook.updated_at = Utc::now();

        store
            .update_cook(&cook)
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        tracing::info!("Cook {} completed onboarding", cook_id);
        Ok(())
    }

    /// Get a cook's progression snapshot derived from stored experience.
    pub fn progress(
        &self,
        cook_id: &Uuid,
        ladder: &LevelLadder,
    ) -> Result<CookProgress, ProfileError> {
        let store = CookStore::new(self.db.connection());
        let cook = store
            .get_cook(cook_id)
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?
            .ok_or(ProfileError::NotFound(*cook_id))?;

        let tier = ladder.level_of(cook.experience).clone();
        let progress = ladder.progress_to_next(cook.experience);

        Ok(CookProgress {
            experience: cook.experience,
            tier,
            fraction: progress.fraction,
            xp_to_next: progress.xp_to_next,
            next_tier: progress.next.cloned(),
        })
    }
}

/// Profile errors.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid display name")]
    InvalidDisplayName,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
