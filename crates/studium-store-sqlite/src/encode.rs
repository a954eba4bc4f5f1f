//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and UUIDs as hyphenated
//! lowercase strings. Numbers and flags use SQLite's native types.

use chrono::{DateTime, Utc};
use studium_core::{
  account::Account, grade::Grade, reminder::Reminder, subject::Subject,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSubject::from_row`].
pub const SUBJECT_COLUMNS: &str = "subject_id, name, description";

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id:  String,
  pub name:        String,
  pub description: Option<String>,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:  row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:          decode_uuid(&self.subject_id)?,
      name:        self.name,
      description: self.description,
    })
  }
}

/// Column list matching [`RawGrade::from_row`].
pub const GRADE_COLUMNS: &str = "grade_id, subject_id, name, value, weight";

/// Raw values read directly from a `grades` row.
pub struct RawGrade {
  pub grade_id:   String,
  pub subject_id: String,
  pub name:       String,
  pub value:      f64,
  pub weight:     f64,
}

impl RawGrade {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      grade_id:   row.get(0)?,
      subject_id: row.get(1)?,
      name:       row.get(2)?,
      value:      row.get(3)?,
      weight:     row.get(4)?,
    })
  }

  pub fn into_grade(self) -> Result<Grade> {
    Ok(Grade {
      id:         decode_uuid(&self.grade_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      name:       self.name,
      value:      self.value,
      weight:     self.weight,
    })
  }
}

/// Column list matching [`RawReminder::from_row`].
pub const REMINDER_COLUMNS: &str =
  "reminder_id, title, description, due_at, completed, subject_id";

/// Raw values read directly from a `reminders` row.
pub struct RawReminder {
  pub reminder_id: String,
  pub title:       String,
  pub description: Option<String>,
  pub due_at:      String,
  pub completed:   bool,
  pub subject_id:  Option<String>,
}

impl RawReminder {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      reminder_id: row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      due_at:      row.get(3)?,
      completed:   row.get(4)?,
      subject_id:  row.get(5)?,
    })
  }

  pub fn into_reminder(self) -> Result<Reminder> {
    Ok(Reminder {
      id:          decode_uuid(&self.reminder_id)?,
      title:       self.title,
      description: self.description,
      date:        decode_dt(&self.due_at)?,
      completed:   self.completed,
      subject_id:  self.subject_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}

/// Column list matching [`RawAccount::from_row`].
pub const ACCOUNT_COLUMNS: &str =
  "account_id, name, email, password_hash, created_at";

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:            decode_uuid(&self.account_id)?,
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
