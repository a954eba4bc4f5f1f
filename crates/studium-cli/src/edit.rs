//! Merging the flags given to an `edit` subcommand over the record being
//! edited. Edits replace every mutable field, so unset flags carry the
//! current values forward.

use chrono::{DateTime, Utc};
use studium_core::{
  grade::{Grade, NewGrade},
  reminder::{NewReminder, Reminder},
};
use uuid::Uuid;

/// `grades edit` flags; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct GradeEdit {
  pub subject_id: Option<Uuid>,
  pub name:       Option<String>,
  pub value:      Option<f64>,
  pub weight:     Option<f64>,
}

impl GradeEdit {
  pub fn apply(self, current: &Grade) -> NewGrade {
    NewGrade {
      subject_id: self.subject_id.unwrap_or(current.subject_id),
      name:       self.name.unwrap_or_else(|| current.name.clone()),
      value:      self.value.unwrap_or(current.value),
      weight:     self.weight.unwrap_or(current.weight),
    }
  }
}

/// What happens to a reminder's subject link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubjectLink {
  #[default]
  Keep,
  Set(Uuid),
  Clear,
}

/// `reminders edit` flags. An empty description clears it.
#[derive(Debug, Default)]
pub struct ReminderEdit {
  pub title:       Option<String>,
  pub date:        Option<DateTime<Utc>>,
  pub description: Option<String>,
  pub subject:     SubjectLink,
}

impl ReminderEdit {
  pub fn apply(self, current: &Reminder) -> NewReminder {
    let description = match self.description {
      Some(d) if d.trim().is_empty() => None,
      Some(d) => Some(d),
      None => current.description.clone(),
    };
    let subject_id = match self.subject {
      SubjectLink::Keep => current.subject_id,
      SubjectLink::Set(id) => Some(id),
      SubjectLink::Clear => None,
    };
    NewReminder {
      title: self.title.unwrap_or_else(|| current.title.clone()),
      description,
      date: self.date.unwrap_or(current.date),
      completed: current.completed,
      subject_id,
    }
  }
}
