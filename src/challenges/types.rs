//! Core types for cooking challenges and participation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cooking challenge with a time window and an XP reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Experience granted on successful completion.
    pub reward_xp: u32,
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    /// Whether the challenge can still be entered at the given instant.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.ends_at
    }
}

/// Status of an individual challenge entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    InProgress,
    /// Terminal; the reward has been granted.
    Succeeded,
    /// Terminal for this record; re-participating creates a fresh entry.
    Abandoned,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::InProgress => "in_progress",
            EntryStatus::Succeeded => "succeeded",
            EntryStatus::Abandoned => "abandoned",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(EntryStatus::InProgress),
            "succeeded" => Some(EntryStatus::Succeeded),
            "abandoned" => Some(EntryStatus::Abandoned),
            _ => None,
        }
    }
}

/// One cook's entry in a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeEntry {
    pub id: Uuid,
    pub challenge_id: Uuid,
    pub cook_id: Uuid,
    pub status: EntryStatus,
    /// The cooking session submitted as proof, set once succeeded.
    pub session_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The state a cook holds with respect to one challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationState {
    NotParticipating,
    InProgress,
    Succeeded,
    Abandoned,
}

/// A club registered for a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubChallengeEntry {
    pub id: Uuid,
    pub challenge_id: Uuid,
    pub club_id: Uuid,
    /// The owner who registered the club.
    pub registered_by: Uuid,
    pub registered_at: DateTime<Utc>,
}

/// Per-club outcome of a batch registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    /// The club was already registered; skipped, not an error.
    AlreadyRegistered,
    /// The acting cook does not own this club.
    NotClubOwner,
    ClubNotFound,
}

/// Result row of a batch club registration.
#[derive(Debug, Clone)]
pub struct ClubRegistration {
    pub club_id: Uuid,
    pub outcome: RegistrationOutcome,
}
