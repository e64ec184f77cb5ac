//! Database schema definitions for Toque.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Cooks table
CREATE TABLE IF NOT EXISTS cooks (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    avatar_id TEXT,
    bio TEXT,
    experience INTEGER NOT NULL DEFAULT 0,
    onboarding_completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Clubs table
CREATE TABLE IF NOT EXISTS clubs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    visibility TEXT NOT NULL DEFAULT 'public',
    owner_cook_id TEXT NOT NULL REFERENCES cooks(id),
    created_at TEXT NOT NULL
);

-- Club memberships table
CREATE TABLE IF NOT EXISTS club_members (
    id TEXT PRIMARY KEY,
    club_id TEXT NOT NULL REFERENCES clubs(id),
    cook_id TEXT NOT NULL REFERENCES cooks(id),
    role TEXT NOT NULL DEFAULT 'member',
    joined_at TEXT NOT NULL,
    UNIQUE(club_id, cook_id)
);

-- A club carries its owner as a membership row; at most one per club.
CREATE UNIQUE INDEX IF NOT EXISTS idx_club_members_owner
    ON club_members(club_id) WHERE role = 'owner';

CREATE INDEX IF NOT EXISTS idx_club_members_cook ON club_members(cook_id);

-- Join requests table (private clubs only)
CREATE TABLE IF NOT EXISTS join_requests (
    id TEXT PRIMARY KEY,
    club_id TEXT NOT NULL REFERENCES clubs(id),
    cook_id TEXT NOT NULL REFERENCES cooks(id),
    status TEXT NOT NULL DEFAULT 'pending',
    requested_at TEXT NOT NULL,
    decided_at TEXT
);

-- At most one pending request per (club, cook) pair.
CREATE UNIQUE INDEX IF NOT EXISTS idx_join_requests_pending
    ON join_requests(club_id, cook_id) WHERE status = 'pending';

-- Club chat messages table
CREATE TABLE IF NOT EXISTS club_messages (
    id TEXT PRIMARY KEY,
    club_id TEXT NOT NULL REFERENCES clubs(id),
    sender_cook_id TEXT NOT NULL REFERENCES cooks(id),
    body TEXT NOT NULL,
    sent_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_club_messages_club ON club_messages(club_id);

-- Challenges table
CREATE TABLE IF NOT EXISTS challenges (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    reward_xp INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- Individual challenge entries table
CREATE TABLE IF NOT EXISTS challenge_entries (
    id TEXT PRIMARY KEY,
    challenge_id TEXT NOT NULL REFERENCES challenges(id),
    cook_id TEXT NOT NULL REFERENCES cooks(id),
    status TEXT NOT NULL DEFAULT 'in_progress',
    session_id TEXT,
    started_at TEXT NOT NULL,
    completed_at TEXT
);

-- At most one live (not abandoned) entry per (challenge, cook) pair;
-- abandoned entries remain as history.
CREATE UNIQUE INDEX IF NOT EXISTS idx_challenge_entries_live
    ON challenge_entries(challenge_id, cook_id) WHERE status != 'abandoned';

CREATE INDEX IF NOT EXISTS idx_challenge_entries_cook ON challenge_entries(cook_id);

-- Club challenge entries table
CREATE TABLE IF NOT EXISTS club_challenge_entries (
    id TEXT PRIMARY KEY,
    challenge_id TEXT NOT NULL REFERENCES challenges(id),
    club_id TEXT NOT NULL REFERENCES clubs(id),
    registered_by TEXT NOT NULL REFERENCES cooks(id),
    registered_at TEXT NOT NULL,
    UNIQUE(challenge_id, club_id)
);
"#;

/// SQL for the schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;
