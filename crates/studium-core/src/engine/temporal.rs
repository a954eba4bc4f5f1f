//! Reminder timing: overdue and upcoming.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How far ahead a reminder counts as upcoming.
pub const UPCOMING_WINDOW_HOURS: i64 = 24;

/// The temporal state of a reminder relative to some instant.
///
/// Derived on every read from the reminder's fields and the current instant;
/// never persisted on the reminder itself.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct ReminderStatus {
  /// Not completed and already past due.
  pub is_overdue:  bool,
  /// Due strictly after `now` and less than 24 hours away. Completion is not
  /// consulted, so a finished task can still be upcoming.
  pub is_upcoming: bool,
}

impl ReminderStatus {
  pub fn classify(
    date: DateTime<Utc>,
    completed: bool,
    now: DateTime<Utc>,
  ) -> Self {
    let is_overdue = !completed && date < now;
    let is_upcoming =
      date > now && date - now < Duration::hours(UPCOMING_WINDOW_HOURS);
    Self {
      is_overdue,
      is_upcoming,
    }
  }
}
