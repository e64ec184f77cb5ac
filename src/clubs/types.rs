//! Core types for clubs, memberships, and join requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Club visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubVisibility {
    /// Anyone may join directly.
    Public,
    /// Joining requires an owner-approved request.
    Private,
}

impl ClubVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClubVisibility::Public => "public",
            ClubVisibility::Private => "private",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(ClubVisibility::Public),
            "private" => Some(ClubVisibility::Private),
            _ => None,
        }
    }
}

/// Role a cook holds within a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubRole {
    /// Exactly one per club; cannot leave or be revoked.
    Owner,
    /// May edit club details.
    Admin,
    Member,
}

impl ClubRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClubRole::Owner => "owner",
            ClubRole::Admin => "admin",
            ClubRole::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(ClubRole::Owner),
            "admin" => Some(ClubRole::Admin),
            "member" => Some(ClubRole::Member),
            _ => None,
        }
    }
}

/// A cooking club.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub visibility: ClubVisibility,
    pub owner_cook_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Club membership record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubMembership {
    pub id: Uuid,
    pub club_id: Uuid,
    pub cook_id: Uuid,
    pub role: ClubRole,
    pub joined_at: DateTime<Utc>,
}

/// Join request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

/// A request by a cook to join a private club.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: Uuid,
    pub club_id: Uuid,
    pub cook_id: Uuid,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// A chat message posted in a club.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubMessage {
    pub id: Uuid,
    pub club_id: Uuid,
    pub sender_cook_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// The state a cook holds with respect to one club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    Owner,
    Admin,
    Member,
    /// A join request is awaiting the owner's decision.
    Pending,
    /// The last join request was rejected; re-requesting is blocked.
    Rejected,
    NonMember,
}

impl MembershipState {
    /// Whether the cook currently belongs to the club in any role.
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            MembershipState::Owner | MembershipState::Admin | MembershipState::Member
        )
    }
}

impl From<ClubRole> for MembershipState {
    fn from(role: ClubRole) -> Self {
        match role {
            ClubRole::Owner => MembershipState::Owner,
            ClubRole::Admin => MembershipState::Admin,
            ClubRole::Member => MembershipState::Member,
        }
    }
}
