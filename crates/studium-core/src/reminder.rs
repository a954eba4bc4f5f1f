//! Reminder: a dated task, optionally tied to a subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, engine::temporal::ReminderStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
  pub id:          Uuid,
  pub title:       String,
  pub description: Option<String>,
  /// When the task is due.
  pub date:        DateTime<Utc>,
  pub completed:   bool,
  pub subject_id:  Option<Uuid>,
}

impl Reminder {
  /// Classify this reminder against `now`. Never stored; always recomputed.
  pub fn status(&self, now: DateTime<Utc>) -> ReminderStatus {
    ReminderStatus::classify(self.date, self.completed, now)
  }
}

/// The mutable fields of a [`Reminder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReminder {
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  pub date:        DateTime<Utc>,
  #[serde(default)]
  pub completed:   bool,
  #[serde(default)]
  pub subject_id:  Option<Uuid>,
}

impl NewReminder {
  pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
    Self {
      title: title.into(),
      description: None,
      date,
      completed: false,
      subject_id: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::EmptyName("reminder"));
    }
    Ok(())
  }
}
