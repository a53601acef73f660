//! Database schema and connection management

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Connection to the club database.
///
/// Uniqueness of (player, term), (team, term) and
/// (player_term, team_term) lives in the schema; the query layer relies on it
/// for its insert-if-missing and upsert statements.
pub struct ClubDatabase {
    pub(crate) conn: Connection,
}

/// Tables in foreign-key order, with the columns that identify a row for upserts.
pub const TABLES: &[(&str, &str)] = &[
    ("players", "id"),
    ("guardians", "id"),
    ("player_guardians", "player_id,guardian_id"),
    ("teams", "id"),
    ("terms", "id"),
    ("team_terms", "id"),
    ("player_terms", "id"),
    ("memberships", "id"),
    ("events", "id"),
    ("attendance", "id"),
    ("team_fees", "id"),
    ("payments", "id"),
];

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS players (
    id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    date_of_birth TEXT,
    email TEXT,
    phone TEXT,
    photo_path TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS guardians (
    id INTEGER PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT,
    phone TEXT
);

CREATE TABLE IF NOT EXISTS player_guardians (
    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    guardian_id INTEGER NOT NULL REFERENCES guardians(id) ON DELETE CASCADE,
    relationship TEXT,
    is_primary INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (player_id, guardian_id)
);

CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    age_group TEXT
);

CREATE TABLE IF NOT EXISTS terms (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    starts_on TEXT NOT NULL,
    ends_on TEXT NOT NULL,
    CHECK (ends_on >= starts_on)
);

CREATE TABLE IF NOT EXISTS team_terms (
    id INTEGER PRIMARY KEY,
    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    term_id INTEGER NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
    fee_cents INTEGER NOT NULL DEFAULT 0 CHECK (fee_cents >= 0),
    fee_due_on TEXT,
    UNIQUE (team_id, term_id)
);

CREATE TABLE IF NOT EXISTS player_terms (
    id INTEGER PRIMARY KEY,
    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
    term_id INTEGER NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'registered',
    registered_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (player_id, term_id)
);

CREATE TABLE IF NOT EXISTS memberships (
    id INTEGER PRIMARY KEY,
    player_term_id INTEGER NOT NULL REFERENCES player_terms(id) ON DELETE CASCADE,
    team_term_id INTEGER NOT NULL REFERENCES team_terms(id) ON DELETE CASCADE,
    role TEXT NOT NULL DEFAULT 'player',
    UNIQUE (player_term_id, team_term_id)
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    term_id INTEGER NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
    team_term_id INTEGER REFERENCES team_terms(id) ON DELETE CASCADE,
    location TEXT,
    notes TEXT,
    CHECK (ends_at > starts_at)
);

CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY,
    event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    player_term_id INTEGER NOT NULL REFERENCES player_terms(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    notes TEXT,
    recorded_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (event_id, player_term_id)
);

CREATE TABLE IF NOT EXISTS team_fees (
    id INTEGER PRIMARY KEY,
    player_term_id INTEGER NOT NULL REFERENCES player_terms(id) ON DELETE CASCADE,
    team_term_id INTEGER NOT NULL REFERENCES team_terms(id) ON DELETE CASCADE,
    amount_due_cents INTEGER NOT NULL CHECK (amount_due_cents >= 0),
    UNIQUE (player_term_id, team_term_id)
);

CREATE TABLE IF NOT EXISTS payments (
    id INTEGER PRIMARY KEY,
    team_fee_id INTEGER NOT NULL REFERENCES team_fees(id) ON DELETE CASCADE,
    amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
    paid_on TEXT NOT NULL,
    method TEXT NOT NULL,
    reference TEXT
);

CREATE INDEX IF NOT EXISTS idx_events_term_start ON events(term_id, starts_at);
CREATE INDEX IF NOT EXISTS idx_attendance_player_term ON attendance(player_term_id);
CREATE INDEX IF NOT EXISTS idx_memberships_team_term ON memberships(team_term_id);
CREATE INDEX IF NOT EXISTS idx_payments_fee ON payments(team_fee_id);
";

impl ClubDatabase {
    /// Open (creating if needed) the database file at `path` and ensure tables exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open club database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests and dry runs.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .context("Failed to initialize club schema")?;
        Ok(())
    }
}
