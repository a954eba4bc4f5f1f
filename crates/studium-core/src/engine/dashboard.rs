//! The dashboard summary: counts plus the overall average.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  engine::{average::weighted_average, category::Category},
  grade::Grade,
  reminder::Reminder,
  subject::Subject,
};

/// Reminder counts by state at a given instant.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct ReminderTally {
  pub total:    usize,
  /// Not yet completed.
  pub pending:  usize,
  pub overdue:  usize,
  pub upcoming: usize,
}

impl ReminderTally {
  pub fn of(reminders: &[Reminder], now: DateTime<Utc>) -> Self {
    reminders.iter().fold(Self::default(), |mut tally, r| {
      let status = r.status(now);
      tally.total += 1;
      tally.pending += usize::from(!r.completed);
      tally.overdue += usize::from(status.is_overdue);
      tally.upcoming += usize::from(status.is_upcoming);
      tally
    })
  }
}

/// Overall figures across every subject, grade and reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
  pub subject_count: usize,
  pub grade_count:   usize,
  /// Weighted average over all grades; 0 when there are none.
  pub average_grade: f64,
  /// `None` when there are no grades, so an empty record is not shown as
  /// critical.
  pub category:      Option<Category>,
  pub reminders:     ReminderTally,
}

impl DashboardSummary {
  pub fn compute(
    subjects: &[Subject],
    grades: &[Grade],
    reminders: &[Reminder],
    now: DateTime<Utc>,
  ) -> Result<Self> {
    let average_grade = weighted_average(grades)?;
    Ok(Self {
      subject_count: subjects.len(),
      grade_count: grades.len(),
      average_grade,
      category: (!grades.is_empty()).then(|| Category::of(average_grade)),
      reminders: ReminderTally::of(reminders, now),
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use uuid::Uuid;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 8, 9, 30, 0).unwrap()
  }

  fn reminder(offset_hours: i64, completed: bool) -> Reminder {
    Reminder {
      id: Uuid::new_v4(),
      title: "Task".into(),
      description: None,
      date: now() + Duration::hours(offset_hours),
      completed,
      subject_id: None,
    }
  }

  #[test]
  fn empty_snapshot() {
    let summary = DashboardSummary::compute(&[], &[], &[], now()).unwrap();
    assert_eq!(summary.average_grade, 0.0);
    assert_eq!(summary.category, None);
    assert_eq!(summary.reminders, ReminderTally::default());
  }

  #[test]
  fn counts_and_average() {
    let subject = Subject {
      id:          Uuid::new_v4(),
      name:        "Calculus I".into(),
      description: Some("Limits and derivatives".into()),
    };
    let grades = vec![
      Grade {
        id: Uuid::new_v4(),
        subject_id: subject.id,
        name: "Test 1".into(),
        value: 4.0,
        weight: 1.0,
      },
      Grade {
        id: Uuid::new_v4(),
        subject_id: subject.id,
        name: "Test 2".into(),
        value: 6.0,
        weight: 3.0,
      },
    ];
    let reminders = vec![
      reminder(-2, false), // overdue
      reminder(-2, true),  // done
      reminder(5, false),  // upcoming
      reminder(5, true),   // upcoming, done
      reminder(72, false), // later
    ];

    let summary =
      DashboardSummary::compute(&[subject], &grades, &reminders, now()).unwrap();

    assert_eq!(summary.subject_count, 1);
    assert_eq!(summary.grade_count, 2);
    assert_eq!(summary.average_grade, 5.5);
    assert_eq!(summary.category, Some(Category::Warning));
    assert_eq!(
      summary.reminders,
      ReminderTally {
        total:    5,
        pending:  3,
        overdue:  1,
        upcoming: 2,
      }
    );
  }
}
