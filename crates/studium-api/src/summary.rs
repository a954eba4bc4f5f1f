//! Handlers for the cross-entity summaries: `GET /dashboard` and
//! `GET /report`.
//!
//! Both read the whole record from the store and hand the snapshot to the
//! engine. If any read fails the request fails.

use axum::{Json, extract::State};
use studium_core::{
  engine::{DashboardSummary, PerformanceReport},
  store::AcademicStore,
};

use crate::{ApiState, error::ApiError};

/// `GET /dashboard`
pub async fn dashboard<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: AcademicStore,
{
  let (subjects, grades, reminders) = tokio::try_join!(
    state.store.list_subjects(),
    state.store.list_grades(None),
    state.store.list_reminders(),
  )
  .map_err(ApiError::store)?;

  let summary =
    DashboardSummary::compute(&subjects, &grades, &reminders, state.clock.now())?;
  Ok(Json(summary))
}

/// `GET /report`
pub async fn report<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<PerformanceReport>, ApiError>
where
  S: AcademicStore,
{
  let (subjects, grades) = tokio::try_join!(
    state.store.list_subjects(),
    state.store.list_grades(None),
  )
  .map_err(ApiError::store)?;
  Ok(Json(PerformanceReport::build(&subjects, &grades)?))
}
