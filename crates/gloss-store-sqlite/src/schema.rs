//! SQL schema for the Gloss SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    created_at    TEXT NOT NULL      -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS volumes (
    volume_id INTEGER PRIMARY KEY,
    name      TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS pages (
    page_id    INTEGER PRIMARY KEY,
    volume_id  INTEGER NOT NULL REFERENCES volumes(volume_id),
    page_no    INTEGER NOT NULL,
    image_path TEXT NOT NULL UNIQUE,
    UNIQUE (volume_id, page_no)
);

-- The derived columns (title_word, title_word_normalized, text_length) are
-- only ever written together with text; see Entry::set_text.
CREATE TABLE IF NOT EXISTS entries (
    entry_id              INTEGER PRIMARY KEY,
    text                  TEXT NOT NULL,
    title_word            TEXT NOT NULL DEFAULT '',
    title_word_normalized TEXT NOT NULL DEFAULT '',
    text_length           INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS entry_pages (
    entry_page_id INTEGER PRIMARY KEY,
    entry_id      INTEGER NOT NULL REFERENCES entries(entry_id),
    page_id       INTEGER NOT NULL REFERENCES pages(page_id),
    UNIQUE (entry_id, page_id)
);

-- Annotations are never deleted; they are the audit trail. The annotator
-- cap per entry is application policy, not a constraint here.
CREATE TABLE IF NOT EXISTS annotations (
    annotation_id         INTEGER PRIMARY KEY,
    entry_id              INTEGER NOT NULL REFERENCES entries(entry_id),
    user_id               INTEGER NOT NULL REFERENCES users(user_id),
    text                  TEXT NOT NULL,
    title_word            TEXT NOT NULL DEFAULT '',
    title_word_normalized TEXT NOT NULL DEFAULT '',
    text_length           INTEGER NOT NULL DEFAULT 0,
    status                TEXT NOT NULL DEFAULT 'InProgress',
    version               INTEGER NOT NULL,
    created_at            TEXT NOT NULL,
    updated_at            TEXT
);

-- 'references' is an SQL keyword; the table is 'refs'.
CREATE TABLE IF NOT EXISTS refs (
    reference_id INTEGER PRIMARY KEY,
    text         TEXT NOT NULL UNIQUE,
    is_approved  INTEGER NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT
);

CREATE TABLE IF NOT EXISTS evaluation_intervals (
    interval_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    start_date  TEXT NOT NULL,       -- YYYY-MM-DD; [start, end) half-open
    end_date    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS annotations_entry_idx  ON annotations(entry_id);
CREATE INDEX IF NOT EXISTS annotations_user_idx   ON annotations(user_id);
CREATE INDEX IF NOT EXISTS annotations_status_idx ON annotations(status);
CREATE INDEX IF NOT EXISTS pages_volume_idx       ON pages(volume_id);
CREATE INDEX IF NOT EXISTS entry_pages_entry_idx  ON entry_pages(entry_id);

PRAGMA user_version = 1;
";
