//! The `AcademicStore` trait, the persistence boundary.
//!
//! The trait is implemented by storage backends (e.g.
//! `studium-store-sqlite`). Higher layers (`studium-api`) depend on this
//! abstraction, not on any concrete backend. The engine never touches a
//! store: callers read a snapshot first and pass plain slices in.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, NewAccount},
  grade::{Grade, NewGrade},
  reminder::{NewReminder, Reminder},
  subject::{NewSubject, Subject},
};

/// A store failure that can say whether the caller's input caused it.
///
/// Validation failures and references to missing subjects are rejections;
/// everything else is the store's own fault.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_rejection(&self) -> bool;
}

/// Abstraction over a Studium storage backend.
///
/// Edits are full replacements of an entity's mutable fields; identifiers
/// never change. List operations return entities in insertion order.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AcademicStore: Send + Sync {
  type Error: StoreError;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Persist a new subject under a fresh UUID.
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Retrieve a subject by UUID. Returns `None` if not found.
  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Replace a subject's fields. Returns `None` if the subject does not
  /// exist.
  fn update_subject(
    &self,
    id: Uuid,
    input: NewSubject,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Delete a subject together with its grades. Reminders that referenced it
  /// keep existing without a subject. Returns `false` if nothing was deleted.
  fn delete_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Grades ────────────────────────────────────────────────────────────

  /// Persist a new grade. Fails if `input.subject_id` does not exist.
  fn add_grade(
    &self,
    input: NewGrade,
  ) -> impl Future<Output = Result<Grade, Self::Error>> + Send + '_;

  fn get_grade(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Grade>, Self::Error>> + Send + '_;

  /// List grades, optionally only those of one subject.
  fn list_grades(
    &self,
    subject_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Grade>, Self::Error>> + Send + '_;

  fn update_grade(
    &self,
    id: Uuid,
    input: NewGrade,
  ) -> impl Future<Output = Result<Option<Grade>, Self::Error>> + Send + '_;

  fn delete_grade(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Reminders ─────────────────────────────────────────────────────────

  fn add_reminder(
    &self,
    input: NewReminder,
  ) -> impl Future<Output = Result<Reminder, Self::Error>> + Send + '_;

  fn get_reminder(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Reminder>, Self::Error>> + Send + '_;

  fn list_reminders(
    &self,
  ) -> impl Future<Output = Result<Vec<Reminder>, Self::Error>> + Send + '_;

  fn update_reminder(
    &self,
    id: Uuid,
    input: NewReminder,
  ) -> impl Future<Output = Result<Option<Reminder>, Self::Error>> + Send + '_;

  fn delete_reminder(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Flip a reminder's `completed` flag and return the updated reminder.
  fn toggle_reminder(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Reminder>, Self::Error>> + Send + '_;
}

/// Accounts that may sign in, kept next to the academic record they unlock.
pub trait AccountStore: AcademicStore {
  /// Persist a new account. Returns `None` if the email is already taken.
  fn add_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Look an account up by email, compared case-insensitively.
  fn find_account(
    &self,
    email: &str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;
}
