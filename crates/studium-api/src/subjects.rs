//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects` | All subjects, insertion order |
//! | `POST`   | `/subjects` | Body: [`NewSubject`]; returns 201 |
//! | `GET`    | `/subjects/{id}` | 404 if not found |
//! | `PUT`    | `/subjects/{id}` | Body: [`NewSubject`]; full replace |
//! | `DELETE` | `/subjects/{id}` | Also deletes the subject's grades |
//! | `GET`    | `/subjects/{id}/average` | [`SubjectAverage`] |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use studium_core::{
  engine::{SubjectAverage, subject_average},
  store::AcademicStore,
  subject::{NewSubject, Subject},
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("subject {id} not found")) }

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /subjects`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: AcademicStore,
{
  let subjects = state.store.list_subjects().await.map_err(ApiError::store)?;
  Ok(Json(subjects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /subjects` — body: `{"name":"...","description":"..."}`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewSubject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
{
  body.validate()?;
  let subject = state.store.add_subject(body).await.map_err(ApiError::store)?;
  tracing::info!(subject_id = %subject.id, name = %subject.name, "subject created");
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subjects/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subject>, ApiError>
where
  S: AcademicStore,
{
  let subject = state
    .store
    .get_subject(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(subject))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /subjects/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewSubject>,
) -> Result<Json<Subject>, ApiError>
where
  S: AcademicStore,
{
  body.validate()?;
  let subject = state
    .store
    .update_subject(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(subject_id = %id, "subject updated");
  Ok(Json(subject))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subjects/{id}`, 204 on success.
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AcademicStore,
{
  if !state.store.delete_subject(id).await.map_err(ApiError::store)? {
    return Err(not_found(id));
  }
  tracing::info!(subject_id = %id, "subject deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Average ──────────────────────────────────────────────────────────────────

/// `GET /subjects/{id}/average`
///
/// A subject with no grades answers `average: 0` with `grade_count: 0`.
pub async fn average<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SubjectAverage>, ApiError>
where
  S: AcademicStore,
{
  state
    .store
    .get_subject(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;

  let grades = state
    .store
    .list_grades(Some(id))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subject_average(&grades, id)?))
}
