//! Handlers for `/grades` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/grades` | Optional `?subject_id=`; each grade carries its category |
//! | `POST`   | `/grades` | Body: [`NewGrade`]; subject must exist; returns 201 |
//! | `GET`    | `/grades/{id}` | 404 if not found |
//! | `PUT`    | `/grades/{id}` | Body: [`NewGrade`]; full replace |
//! | `DELETE` | `/grades/{id}` | 204 |
//! | `GET`    | `/grades/by-subject` | [`GradesBySubject`], graded subjects only |
//! | `GET`    | `/grades/average` | Overall weighted average |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use studium_core::{
  engine::{Category, GradesBySubject, group_by_subject, weighted_average},
  grade::{Grade, NewGrade},
  store::AcademicStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

fn not_found(id: Uuid) -> ApiError { ApiError::NotFound(format!("grade {id} not found")) }

/// A grade as served by the API: the stored fields plus its category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeView {
  #[serde(flatten)]
  pub grade:    Grade,
  pub category: Category,
}

impl From<Grade> for GradeView {
  fn from(grade: Grade) -> Self {
    Self {
      category: grade.category(),
      grade,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If set, only grades belonging to this subject.
  pub subject_id: Option<Uuid>,
}

/// `GET /grades[?subject_id=<id>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<GradeView>>, ApiError>
where
  S: AcademicStore,
{
  let grades = state
    .store
    .list_grades(params.subject_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(grades.into_iter().map(GradeView::from).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /grades` — body: `{"subject_id":"...","name":"...","value":8.5,"weight":2}`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewGrade>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
{
  body.validate()?;

  let grade = state.store.add_grade(body).await.map_err(ApiError::store)?;
  tracing::info!(
    grade_id = %grade.id,
    subject_id = %grade.subject_id,
    value = grade.value,
    weight = grade.weight,
    "grade recorded"
  );
  Ok((StatusCode::CREATED, Json(GradeView::from(grade))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /grades/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GradeView>, ApiError>
where
  S: AcademicStore,
{
  let grade = state
    .store
    .get_grade(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(grade.into()))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /grades/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewGrade>,
) -> Result<Json<GradeView>, ApiError>
where
  S: AcademicStore,
{
  body.validate()?;

  let grade = state
    .store
    .update_grade(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(grade_id = %id, "grade updated");
  Ok(Json(grade.into()))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /grades/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AcademicStore,
{
  if !state.store.delete_grade(id).await.map_err(ApiError::store)? {
    return Err(not_found(id));
  }
  tracing::info!(grade_id = %id, "grade deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Aggregates ───────────────────────────────────────────────────────────────

/// `GET /grades/by-subject`
pub async fn by_subject<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<GradesBySubject>, ApiError>
where
  S: AcademicStore,
{
  let (subjects, grades) = tokio::try_join!(
    state.store.list_subjects(),
    state.store.list_grades(None),
  )
  .map_err(ApiError::store)?;
  Ok(Json(group_by_subject(&subjects, &grades)?))
}

/// Body of `GET /grades/average`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallAverage {
  pub average:     f64,
  pub grade_count: usize,
  /// Absent when there are no grades.
  pub category:    Option<Category>,
}

/// `GET /grades/average`
pub async fn overall_average<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<OverallAverage>, ApiError>
where
  S: AcademicStore,
{
  let grades = state.store.list_grades(None).await.map_err(ApiError::store)?;
  let average = weighted_average(&grades)?;
  Ok(Json(OverallAverage {
    average,
    grade_count: grades.len(),
    category: (!grades.is_empty()).then(|| Category::of(average)),
  }))
}
