//! Toque - Social Cooking Domain Core
//!
//! Domain rules for a social cooking companion app: cook profiles with an
//! XP-based progression ladder, cooking clubs with membership roles and
//! owner-moderated join requests, and time-boxed cooking challenges with
//! individual and club participation. Persistence lives behind a small
//! SQLite-backed storage layer; presentation is a separate concern.

pub mod challenges;
pub mod clubs;
pub mod cooks;
pub mod events;
pub mod identity;
pub mod progression;
pub mod storage;

// Re-export commonly used types
pub use challenges::{ChallengeManager, ClubEntryManager};
pub use clubs::{ClubManager, ModerationQueue};
pub use cooks::ProfileManager;
pub use events::{ChangeEvent, ChangeFeed};
pub use identity::{Identity, LocalSession};
pub use progression::LevelLadder;
pub use storage::Database;
