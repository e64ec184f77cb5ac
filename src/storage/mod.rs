//! Storage module for database and configuration.

pub mod challenge_store;
pub mod club_store;
pub mod config;
pub mod cook_store;
pub mod database;
pub mod schema;

pub use challenge_store::ChallengeStore;
pub use club_store::ClubStore;
pub use config::{AppConfig, ChatSettings, DatabaseSettings};
pub use cook_store::CookStore;
pub use database::{Database, DatabaseError};
