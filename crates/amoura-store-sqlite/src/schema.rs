//! SQL schema for the Amoura SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,  -- trimmed + lower-cased
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- One decision per ordered (actor, target) pair.
-- Re-swipes update the row in place; rows are never deleted.
CREATE TABLE IF NOT EXISTS swipes (
    actor_id   TEXT NOT NULL REFERENCES users(user_id),
    target_id  TEXT NOT NULL REFERENCES users(user_id),
    direction  TEXT NOT NULL CHECK (direction IN ('like', 'pass', 'superlike')),
    decided_at TEXT NOT NULL,
    PRIMARY KEY (actor_id, target_id),
    CHECK (actor_id != target_id)
);

-- Members are stored in canonical order (user_low < user_high), so the same
-- pair always lands on the same index key.
CREATE TABLE IF NOT EXISTS matches (
    match_id         TEXT PRIMARY KEY,
    user_low         TEXT NOT NULL REFERENCES users(user_id),
    user_high        TEXT NOT NULL REFERENCES users(user_id),
    created_at       TEXT NOT NULL,
    last_activity_at TEXT NOT NULL,
    active           INTEGER NOT NULL DEFAULT 1,
    CHECK (user_low < user_high)
);

-- At most one active match per unordered pair. Deactivated rows are history
-- and do not block a new match.
CREATE UNIQUE INDEX IF NOT EXISTS matches_active_pair_idx
    ON matches(user_low, user_high) WHERE active = 1;

CREATE INDEX IF NOT EXISTS matches_low_idx      ON matches(user_low);
CREATE INDEX IF NOT EXISTS matches_high_idx     ON matches(user_high);
CREATE INDEX IF NOT EXISTS matches_activity_idx ON matches(last_activity_at);

CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    match_id   TEXT NOT NULL REFERENCES matches(match_id),
    sender_id  TEXT NOT NULL REFERENCES users(user_id),
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS messages_match_idx ON messages(match_id, created_at);

PRAGMA user_version = 1;
";
