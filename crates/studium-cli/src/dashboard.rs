//! Client-side dashboard.
//!
//! Subjects, grades and reminders are fetched concurrently and each may fail
//! on its own; the figures are computed from whatever arrived and the rest is
//! reported as unavailable. A rejected session still aborts the whole view.

use anyhow::Result;
use chrono::{DateTime, Utc};
use studium_core::{
  engine::{Category, PerformanceReport, ReminderTally, SubjectStanding, weighted_average},
  grade::Grade,
  reminder::Reminder,
  subject::Subject,
};

use crate::client::{ApiClient, SessionExpired};

/// One resource as fetched: the data, or why it could not be loaded.
pub type Fetched<T> = Result<T, String>;

pub struct Snapshot {
  pub subjects:  Fetched<Vec<Subject>>,
  pub grades:    Fetched<Vec<Grade>>,
  pub reminders: Fetched<Vec<Reminder>>,
}

impl Snapshot {
  pub async fn fetch(client: &ApiClient) -> Result<Self> {
    let (subjects, grades, reminders) = tokio::join!(
      client.list_subjects(),
      client.list_grades(None),
      client.list_reminders(None),
    );

    let failures = [
      subjects.as_ref().err(),
      grades.as_ref().err(),
      reminders.as_ref().err(),
    ];
    if failures.into_iter().flatten().any(|e| e.is::<SessionExpired>()) {
      return Err(SessionExpired.into());
    }

    Ok(Self {
      subjects:  degrade("subjects", subjects),
      grades:    degrade("grades", grades),
      reminders: degrade("reminders", reminders),
    })
  }

  pub fn figures(&self, now: DateTime<Utc>) -> studium_core::Result<Figures> {
    let grades = match &self.grades {
      Ok(grades) => {
        let average = weighted_average(grades)?;
        Some(GradeFigures {
          count: grades.len(),
          average,
          category: (!grades.is_empty()).then(|| Category::of(average)),
        })
      }
      Err(_) => None,
    };

    let standings = match (&self.subjects, &self.grades) {
      (Ok(subjects), Ok(grades)) => {
        Some(PerformanceReport::build(subjects, grades)?.standings)
      }
      _ => None,
    };

    let (reminders, attention) = match &self.reminders {
      Ok(list) => (Some(ReminderTally::of(list, now)), needs_attention(list, now)),
      Err(_) => (None, Vec::new()),
    };

    let unavailable = [
      ("subjects", self.subjects.as_ref().err()),
      ("grades", self.grades.as_ref().err()),
      ("reminders", self.reminders.as_ref().err()),
    ]
    .into_iter()
    .filter_map(|(what, err)| err.map(|e| (what, e.clone())))
    .collect();

    Ok(Figures {
      subject_count: self.subjects.as_ref().ok().map(Vec::len),
      grades,
      standings,
      reminders,
      attention,
      unavailable,
    })
  }
}

fn degrade<T>(what: &str, result: Result<T>) -> Fetched<T> {
  result.map_err(|e| {
    tracing::warn!(error = %e, "{what} unavailable");
    format!("{e:#}")
  })
}

/// Pending reminders that are overdue or due soon, most urgent first.
fn needs_attention(reminders: &[Reminder], now: DateTime<Utc>) -> Vec<Reminder> {
  let mut due: Vec<Reminder> = reminders
    .iter()
    .filter(|r| {
      let status = r.status(now);
      !r.completed && (status.is_overdue || status.is_upcoming)
    })
    .cloned()
    .collect();
  due.sort_by_key(|r| r.date);
  due
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeFigures {
  pub count:    usize,
  pub average:  f64,
  pub category: Option<Category>,
}

/// What the dashboard shows. `None` marks a resource that failed to load.
#[derive(Debug, Clone, PartialEq)]
pub struct Figures {
  pub subject_count: Option<usize>,
  pub grades:        Option<GradeFigures>,
  pub standings:     Option<Vec<SubjectStanding>>,
  pub reminders:     Option<ReminderTally>,
  pub attention:     Vec<Reminder>,
  /// `(resource, reason)` for each failed fetch.
  pub unavailable:   Vec<(&'static str, String)>,
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, http::StatusCode, routing::get};
  use chrono::{Duration, TimeZone};
  use serde_json::json;
  use studium_core::engine::DashboardSummary;
  use uuid::Uuid;

  use super::*;
  use crate::testing::serve;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 8, 12, 0, 0).unwrap()
  }

  fn subject(name: &str) -> Subject {
    Subject {
      id:          Uuid::new_v4(),
      name:        name.into(),
      description: None,
    }
  }

  fn grade(subject_id: Uuid, value: f64, weight: f64) -> Grade {
    Grade {
      id: Uuid::new_v4(),
      subject_id,
      name: "Test".into(),
      value,
      weight,
    }
  }

  fn reminder(title: &str, offset: Duration, completed: bool) -> Reminder {
    Reminder {
      id: Uuid::new_v4(),
      title: title.into(),
      description: None,
      date: now() + offset,
      completed,
      subject_id: None,
    }
  }

  fn full() -> Snapshot {
    let calculus = subject("Calculus I");
    let physics = subject("Physics I");
    Snapshot {
      grades:    Ok(vec![
        grade(calculus.id, 8.5, 2.0),
        grade(calculus.id, 9.0, 1.0),
        grade(physics.id, 4.0, 1.0),
      ]),
      subjects:  Ok(vec![calculus, physics]),
      reminders: Ok(vec![
        reminder("Later", Duration::days(3), false),
        reminder("Soon", Duration::hours(3), false),
        reminder("Late", -Duration::hours(1), false),
        reminder("Done", Duration::hours(2), true),
      ]),
    }
  }

  #[test]
  fn complete_snapshot_matches_server_summary() {
    let snap = full();
    let figures = snap.figures(now()).unwrap();
    let summary = DashboardSummary::compute(
      snap.subjects.as_ref().unwrap(),
      snap.grades.as_ref().unwrap(),
      snap.reminders.as_ref().unwrap(),
      now(),
    )
    .unwrap();

    assert_eq!(figures.subject_count, Some(summary.subject_count));
    let grades = figures.grades.unwrap();
    assert_eq!(grades.count, summary.grade_count);
    assert!((grades.average - summary.average_grade).abs() < 1e-12);
    assert_eq!(grades.category, summary.category);
    assert_eq!(figures.reminders, Some(summary.reminders));
    assert!(figures.unavailable.is_empty());
  }

  #[test]
  fn attention_lists_pending_urgent_reminders_by_date() {
    let figures = full().figures(now()).unwrap();
    let titles: Vec<&str> = figures.attention.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Late", "Soon"]);
  }

  #[test]
  fn failed_grades_keep_the_rest() {
    let mut snap = full();
    snap.grades = Err("GET /grades → 500".into());
    let figures = snap.figures(now()).unwrap();

    assert_eq!(figures.subject_count, Some(2));
    assert!(figures.grades.is_none());
    assert!(figures.standings.is_none());
    assert_eq!(figures.reminders.unwrap().overdue, 1);
    assert_eq!(figures.unavailable, [("grades", "GET /grades → 500".to_string())]);
  }

  #[test]
  fn everything_failed() {
    let snap = Snapshot {
      subjects:  Err("down".into()),
      grades:    Err("down".into()),
      reminders: Err("down".into()),
    };
    let figures = snap.figures(now()).unwrap();
    assert_eq!(figures.subject_count, None);
    assert_eq!(figures.reminders, None);
    assert!(figures.attention.is_empty());
    assert_eq!(figures.unavailable.len(), 3);
  }

  #[test]
  fn no_grades_has_no_category() {
    let snap = Snapshot {
      subjects:  Ok(vec![subject("History")]),
      grades:    Ok(Vec::new()),
      reminders: Ok(Vec::new()),
    };
    let grades = snap.figures(now()).unwrap().grades.unwrap();
    assert_eq!(grades.count, 0);
    assert_eq!(grades.average, 0.0);
    assert_eq!(grades.category, None);
  }

  #[test]
  fn corrupt_weight_is_an_error() {
    let mut snap = full();
    if let Ok(grades) = &mut snap.grades {
      grades[0].weight = 0.0;
    }
    assert!(snap.figures(now()).is_err());
  }

  fn stub(grades: StatusCode) -> Router {
    Router::new()
      .route("/api/subjects", get(|| async { Json(json!([])) }))
      .route("/api/reminders", get(|| async { Json(json!([])) }))
      .route(
        "/api/grades",
        get(move || async move { (grades, Json(json!({ "error": "grades down" }))) }),
      )
  }

  #[tokio::test]
  async fn one_failed_resource_degrades() {
    let base = serve(stub(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let client = ApiClient::new(base, Some("token".into())).unwrap();

    let snap = Snapshot::fetch(&client).await.unwrap();
    assert!(snap.subjects.is_ok());
    assert!(snap.reminders.is_ok());
    assert!(snap.grades.unwrap_err().contains("grades down"));
  }

  #[tokio::test]
  async fn one_rejected_resource_aborts_the_view() {
    let base = serve(stub(StatusCode::UNAUTHORIZED)).await;
    let client = ApiClient::new(base, Some("token".into())).unwrap();

    let err = Snapshot::fetch(&client).await.err().unwrap();
    assert!(err.is::<SessionExpired>());
  }
}
