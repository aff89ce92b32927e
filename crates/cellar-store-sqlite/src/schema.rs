//! SQL schema for the Cellar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    version       INTEGER DEFAULT 1,   -- 1 | 2; NULL means unset
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,       -- hex SHA-256 of the bearer token
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS wines (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id   TEXT NOT NULL REFERENCES users(user_id),
    name       TEXT NOT NULL,
    image_url  TEXT,
    year       INTEGER NOT NULL,
    wine_type  TEXT NOT NULL CHECK (wine_type IN ('RED', 'WHITE', 'ROSE')),
    varietal   TEXT NOT NULL,
    rating     REAL NOT NULL,
    winery_key TEXT NOT NULL,
    note       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- counter is scoped to the wine's owner, not to the wine.
CREATE TABLE IF NOT EXISTS wine_bottles (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    wine_id       INTEGER NOT NULL REFERENCES wines(id) ON DELETE CASCADE,
    counter       INTEGER NOT NULL,
    consumed      INTEGER NOT NULL DEFAULT 0,
    date_consumed TEXT,
    note          TEXT NOT NULL DEFAULT '',
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_user_idx ON sessions(user_id);
CREATE INDEX IF NOT EXISTS wines_owner_idx   ON wines(owner_id);
CREATE INDEX IF NOT EXISTS bottles_wine_idx  ON wine_bottles(wine_id, counter);

PRAGMA user_version = 1;
";
