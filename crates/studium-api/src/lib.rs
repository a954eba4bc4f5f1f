//! JSON REST API for Studium.
//!
//! Exposes an axum [`Router`] backed by any [`AcademicStore`]. Derived
//! figures (averages, categories, reminder timing) are computed per request
//! by `studium_core::engine` from a fresh read of the store. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", studium_api::api_router(ApiState::new(store.clone())))
//! ```

pub mod error;
pub mod grades;
pub mod reminders;
pub mod subjects;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch},
};
use studium_core::{
  clock::{Clock, SystemClock},
  store::AcademicStore,
};

pub use error::ApiError;

/// Shared state handed to every handler.
pub struct ApiState<S> {
  pub store: Arc<S>,
  /// Source of "now" for reminder classification and the dashboard.
  pub clock: Arc<dyn Clock>,
}

impl<S> ApiState<S> {
  /// State reading the system clock.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      clock: Arc::new(SystemClock),
    }
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      clock: Arc::clone(&self.clock),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: AcademicStore + 'static,
{
  Router::new()
    // Subjects
    .route("/subjects", get(subjects::list::<S>).post(subjects::create::<S>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>)
        .put(subjects::update::<S>)
        .delete(subjects::delete::<S>),
    )
    .route("/subjects/{id}/average", get(subjects::average::<S>))
    // Grades
    .route("/grades", get(grades::list::<S>).post(grades::create::<S>))
    .route("/grades/by-subject", get(grades::by_subject::<S>))
    .route("/grades/average", get(grades::overall_average::<S>))
    .route(
      "/grades/{id}",
      get(grades::get_one::<S>)
        .put(grades::update::<S>)
        .delete(grades::delete::<S>),
    )
    // Reminders
    .route("/reminders", get(reminders::list::<S>).post(reminders::create::<S>))
    .route(
      "/reminders/{id}",
      get(reminders::get_one::<S>)
        .put(reminders::update::<S>)
        .delete(reminders::delete::<S>),
    )
    .route("/reminders/{id}/toggle", patch(reminders::toggle::<S>))
    // Summaries
    .route("/dashboard", get(summary::dashboard::<S>))
    .route("/report", get(summary::report::<S>))
    .with_state(state)
}
