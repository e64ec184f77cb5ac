//! Clubs module.
//!
//! Provides clubs, memberships, join-request moderation, and club chat.

pub mod manager;
pub mod moderation;
pub mod types;

// Re-export commonly used types
pub use manager::{ClubError, ClubManager};
pub use moderation::{Decision, ModerationError, ModerationQueue};
pub use types::*;
