//! Cook profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progression::LevelTier;

/// A cook's profile.
///
/// The held level is always derived from `experience` through a
/// [`crate::progression::LevelLadder`]; it is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookProfile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_id: Option<String>,
    pub bio: Option<String>,
    /// Accumulated experience points.
    pub experience: u32,
    /// Whether the first-run onboarding flow has been completed.
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CookProfile {
    /// Create a new cook profile with default values.
    pub fn new(id: Uuid, display_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name,
            avatar_id: None,
            bio: None,
            experience: 0,
            onboarding_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate a display name (non-empty, at most 40 characters).
    pub fn validate_display_name(name: &str) -> bool {
        let trimmed = name.trim();
        !trimmed.is_empty() && trimmed.chars().count() <= 40
    }
}

/// A cook's derived progression snapshot.
#[derive(Debug, Clone)]
pub struct CookProgress {
    pub experience: u32,
    /// The tier currently held.
    pub tier: LevelTier,
    /// Fraction of the way to the next tier, in [0, 1].
    pub fraction: f64,
    /// Experience still needed for the next tier.
    pub xp_to_next: u32,
    /// The next tier, if the cook is not already at the top.
    pub next_tier: Option<LevelTier>,
}
