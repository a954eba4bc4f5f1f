//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use studium_core::{
  account::NewAccount,
  grade::NewGrade,
  reminder::NewReminder,
  store::{AcademicStore, AccountStore, StoreError as _},
  subject::{NewSubject, Subject},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn subject(s: &SqliteStore, name: &str) -> Subject {
  s.add_subject(NewSubject::new(name)).await.unwrap()
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_subject() {
  let s = store().await;

  let mut input = NewSubject::new("Calculus I");
  input.description = Some("Limits, derivatives and integrals".into());
  let created = s.add_subject(input).await.unwrap();

  let fetched = s.get_subject(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_subject_missing_returns_none() {
  let s = store().await;
  assert!(s.get_subject(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_subjects_in_insertion_order() {
  let s = store().await;
  subject(&s, "Web Programming").await;
  subject(&s, "Calculus I").await;
  subject(&s, "Physics I").await;

  let names: Vec<String> = s
    .list_subjects()
    .await
    .unwrap()
    .into_iter()
    .map(|sub| sub.name)
    .collect();
  assert_eq!(names, ["Web Programming", "Calculus I", "Physics I"]);
}

#[tokio::test]
async fn blank_subject_name_is_rejected() {
  let s = store().await;
  let err = s.add_subject(NewSubject::new("  ")).await.unwrap_err();
  assert!(matches!(err, Error::Core(_)));
}

#[tokio::test]
async fn update_subject_keeps_id() {
  let s = store().await;
  let created = subject(&s, "Calculus").await;

  let updated = s
    .update_subject(created.id, NewSubject::new("Calculus I"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.id, created.id);
  assert_eq!(updated.name, "Calculus I");

  let fetched = s.get_subject(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Calculus I");
}

#[tokio::test]
async fn update_missing_subject_returns_none() {
  let s = store().await;
  let result = s
    .update_subject(Uuid::new_v4(), NewSubject::new("Nobody"))
    .await
    .unwrap();
  assert!(result.is_none());
}

// ─── Grades ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_list_grades_by_subject() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let physics = subject(&s, "Physics I").await;

  s.add_grade(NewGrade::new(calculus.id, "Test 1", 8.5, 2.0))
    .await
    .unwrap();
  s.add_grade(NewGrade::new(physics.id, "Test 1", 6.5, 1.0))
    .await
    .unwrap();
  s.add_grade(NewGrade::new(calculus.id, "Test 2", 9.0, 1.0))
    .await
    .unwrap();

  assert_eq!(s.list_grades(None).await.unwrap().len(), 3);

  let calc = s.list_grades(Some(calculus.id)).await.unwrap();
  let labels: Vec<&str> = calc.iter().map(|g| g.name.as_str()).collect();
  assert_eq!(labels, ["Test 1", "Test 2"]);
  assert_eq!(calc[0].value, 8.5);
  assert_eq!(calc[0].weight, 2.0);
}

#[tokio::test]
async fn grade_for_unknown_subject_fails() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s
    .add_grade(NewGrade::new(missing, "Test", 7.0, 1.0))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(id) if id == missing));
}

#[tokio::test]
async fn zero_weight_grade_is_rejected_before_writing() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let err = s
    .add_grade(NewGrade::new(calculus.id, "Test", 7.0, 0.0))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(studium_core::Error::NonPositiveWeight(_))
  ));
  assert!(s.list_grades(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_grade_replaces_fields() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let physics = subject(&s, "Physics I").await;
  let grade = s
    .add_grade(NewGrade::new(calculus.id, "Test", 5.0, 1.0))
    .await
    .unwrap();

  let updated = s
    .update_grade(grade.id, NewGrade::new(physics.id, "Retake", 7.5, 2.0))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.id, grade.id);

  let fetched = s.get_grade(grade.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
  assert_eq!(fetched.subject_id, physics.id);
}

#[tokio::test]
async fn update_missing_grade_returns_none() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let result = s
    .update_grade(Uuid::new_v4(), NewGrade::new(calculus.id, "x", 5.0, 1.0))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn oversized_weight_is_rejected_before_writing() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let err = s
    .add_grade(NewGrade::new(calculus.id, "Test", 8.0, 1e308))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(studium_core::Error::WeightTooLarge(_))
  ));
  assert!(s.list_grades(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn moving_grade_to_unknown_subject_leaves_it_untouched() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let grade = s
    .add_grade(NewGrade::new(calculus.id, "Test", 5.0, 1.0))
    .await
    .unwrap();

  let missing = Uuid::new_v4();
  let err = s
    .update_grade(grade.id, NewGrade::new(missing, "Test", 9.0, 1.0))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(id) if id == missing));
  assert_eq!(s.get_grade(grade.id).await.unwrap().unwrap(), grade);
}

#[tokio::test]
async fn update_grade_after_its_subject_is_deleted_returns_none() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let grade = s
    .add_grade(NewGrade::new(calculus.id, "Test", 5.0, 1.0))
    .await
    .unwrap();
  s.delete_subject(calculus.id).await.unwrap();

  let result = s
    .update_grade(grade.id, NewGrade::new(calculus.id, "Test", 6.0, 1.0))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn delete_grade() {
  let s = store().await;
  let calculus = subject(&s, "Calculus I").await;
  let grade = s
    .add_grade(NewGrade::new(calculus.id, "Test", 5.0, 1.0))
    .await
    .unwrap();

  assert!(s.delete_grade(grade.id).await.unwrap());
  assert!(!s.delete_grade(grade.id).await.unwrap());
  assert!(s.get_grade(grade.id).await.unwrap().is_none());
}

// ─── Reminders ───────────────────────────────────────────────────────────────

fn due() -> chrono::DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 3, 15, 23, 59, 0).unwrap()
}

#[tokio::test]
async fn reminder_roundtrip_with_subject() {
  let s = store().await;
  let web = subject(&s, "Web Programming").await;

  let mut input = NewReminder::new("Submit final project", due());
  input.description = Some("Upload to the course portal".into());
  input.subject_id = Some(web.id);
  let created = s.add_reminder(input).await.unwrap();

  let fetched = s.get_reminder(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.date, due());
  assert!(!fetched.completed);
}

#[tokio::test]
async fn reminder_without_subject() {
  let s = store().await;
  let created = s
    .add_reminder(NewReminder::new("Buy notebook", due()))
    .await
    .unwrap();
  assert_eq!(created.subject_id, None);
  assert_eq!(s.list_reminders().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reminder_for_unknown_subject_fails() {
  let s = store().await;
  let mut input = NewReminder::new("Study", due());
  input.subject_id = Some(Uuid::new_v4());
  assert!(matches!(
    s.add_reminder(input).await,
    Err(Error::SubjectNotFound(_))
  ));
}

#[tokio::test]
async fn toggle_flips_completion() {
  let s = store().await;
  let created = s
    .add_reminder(NewReminder::new("Read chapter 3", due()))
    .await
    .unwrap();

  let once = s.toggle_reminder(created.id).await.unwrap().unwrap();
  assert!(once.completed);
  let twice = s.toggle_reminder(created.id).await.unwrap().unwrap();
  assert!(!twice.completed);

  assert!(s.toggle_reminder(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_reminder_replaces_fields() {
  let s = store().await;
  let created = s
    .add_reminder(NewReminder::new("Draft", due()))
    .await
    .unwrap();

  let mut input = NewReminder::new("Final", due() + chrono::Duration::days(1));
  input.completed = true;
  let updated = s
    .update_reminder(created.id, input)
    .await
    .unwrap()
    .unwrap();

  let fetched = s.get_reminder(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
  assert_eq!(fetched.title, "Final");
  assert!(fetched.completed);
}

#[tokio::test]
async fn update_missing_reminder_returns_none() {
  let s = store().await;
  let result = s
    .update_reminder(Uuid::new_v4(), NewReminder::new("Ghost", due()))
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn reattaching_reminder_to_unknown_subject_fails() {
  let s = store().await;
  let created = s
    .add_reminder(NewReminder::new("Draft", due()))
    .await
    .unwrap();

  let mut input = NewReminder::new("Draft", due());
  input.subject_id = Some(Uuid::new_v4());
  assert!(matches!(
    s.update_reminder(created.id, input).await,
    Err(Error::SubjectNotFound(_))
  ));
  assert_eq!(s.get_reminder(created.id).await.unwrap().unwrap(), created);
}

// ─── Cascades ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn deleting_subject_removes_grades_and_detaches_reminders() {
  let s = store().await;
  let physics = subject(&s, "Physics I").await;
  let calculus = subject(&s, "Calculus I").await;

  s.add_grade(NewGrade::new(physics.id, "Test 1", 6.0, 1.0))
    .await
    .unwrap();
  s.add_grade(NewGrade::new(calculus.id, "Test 1", 8.0, 1.0))
    .await
    .unwrap();
  let mut input = NewReminder::new("Lab report", due());
  input.subject_id = Some(physics.id);
  let reminder = s.add_reminder(input).await.unwrap();

  assert!(s.delete_subject(physics.id).await.unwrap());

  let grades = s.list_grades(None).await.unwrap();
  assert_eq!(grades.len(), 1);
  assert_eq!(grades[0].subject_id, calculus.id);

  let reminder = s.get_reminder(reminder.id).await.unwrap().unwrap();
  assert_eq!(reminder.subject_id, None);

  assert!(!s.delete_subject(physics.id).await.unwrap());
}

// ─── Accounts ────────────────────────────────────────────────────────────────

fn account(email: &str) -> NewAccount {
  NewAccount {
    name:          "Ana".into(),
    email:         email.into(),
    password_hash: "$argon2id$v=19$stub".into(),
  }
}

#[tokio::test]
async fn account_roundtrip_normalises_email() {
  let s = store().await;
  let created = s
    .add_account(account(" Ana@Example.com "))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(created.email, "ana@example.com");

  let found = s.find_account("ANA@example.COM").await.unwrap().unwrap();
  assert_eq!(found, created);
  assert!(s.find_account("bob@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_refused() {
  let s = store().await;
  assert!(s.add_account(account("ana@example.com")).await.unwrap().is_some());
  assert!(s.add_account(account("ANA@example.com")).await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_account_is_a_rejection() {
  let s = store().await;
  let err = s.add_account(account("not-an-email")).await.unwrap_err();
  assert!(err.is_rejection());
}

// ─── Error classes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn input_errors_are_rejections() {
  let s = store().await;
  let missing = s
    .add_grade(NewGrade::new(Uuid::new_v4(), "Test", 7.0, 1.0))
    .await
    .unwrap_err();
  assert!(missing.is_rejection());

  let invalid = s.add_subject(NewSubject::new("")).await.unwrap_err();
  assert!(invalid.is_rejection());

  assert!(!Error::DateParse("garbage".into()).is_rejection());
}
