//! SQL schema for the Studium SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT
);

-- Deleting a subject takes its grades with it.
CREATE TABLE IF NOT EXISTS grades (
    grade_id   TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
    name       TEXT NOT NULL,
    value      REAL NOT NULL CHECK (value >= 0 AND value <= 10),
    weight     REAL NOT NULL CHECK (weight > 0 AND weight <= 100)
);

-- Reminders outlive their subject; the reference is cleared instead.
CREATE TABLE IF NOT EXISTS reminders (
    reminder_id TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    due_at      TEXT NOT NULL,   -- RFC 3339 UTC
    completed   INTEGER NOT NULL DEFAULT 0,
    subject_id  TEXT REFERENCES subjects(subject_id) ON DELETE SET NULL
);

-- Emails are stored lowercased, so UNIQUE is case-insensitive in practice.
CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL    -- RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS grades_subject_idx    ON grades(subject_id);
CREATE INDEX IF NOT EXISTS reminders_subject_idx ON reminders(subject_id);

PRAGMA user_version = 1;
";
