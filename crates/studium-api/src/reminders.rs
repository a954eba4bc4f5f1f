//! Handlers for `/reminders` endpoints.
//!
//! Every reminder in a response carries `is_overdue` and `is_upcoming`,
//! computed against the state's clock at the time of the request.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/reminders` | Optional `?completed=true\|false` |
//! | `POST`   | `/reminders` | Body: [`NewReminder`]; returns 201 |
//! | `GET`    | `/reminders/{id}` | 404 if not found |
//! | `PUT`    | `/reminders/{id}` | Body: [`NewReminder`]; full replace |
//! | `DELETE` | `/reminders/{id}` | 204 |
//! | `PATCH`  | `/reminders/{id}/toggle` | Flip `completed` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studium_core::{
  engine::ReminderStatus,
  reminder::{NewReminder, Reminder},
  store::AcademicStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

fn not_found(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("reminder {id} not found"))
}

/// A reminder with its temporal status flattened alongside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderView {
  #[serde(flatten)]
  pub reminder: Reminder,
  #[serde(flatten)]
  pub status:   ReminderStatus,
}

impl ReminderView {
  pub fn at(reminder: Reminder, now: DateTime<Utc>) -> Self {
    Self {
      status: reminder.status(now),
      reminder,
    }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// `false` for pending reminders only, `true` for completed only.
  pub completed: Option<bool>,
}

/// `GET /reminders[?completed=<bool>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ReminderView>>, ApiError>
where
  S: AcademicStore,
{
  let mut reminders = state.store.list_reminders().await.map_err(ApiError::store)?;
  if let Some(completed) = params.completed {
    reminders.retain(|r| r.completed == completed);
  }

  let now = state.clock.now();
  Ok(Json(
    reminders
      .into_iter()
      .map(|r| ReminderView::at(r, now))
      .collect(),
  ))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /reminders`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewReminder>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
{
  body.validate()?;

  let reminder = state.store.add_reminder(body).await.map_err(ApiError::store)?;
  tracing::info!(reminder_id = %reminder.id, due = %reminder.date, "reminder created");
  Ok((
    StatusCode::CREATED,
    Json(ReminderView::at(reminder, state.clock.now())),
  ))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /reminders/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReminderView>, ApiError>
where
  S: AcademicStore,
{
  let reminder = state
    .store
    .get_reminder(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(ReminderView::at(reminder, state.clock.now())))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /reminders/{id}`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewReminder>,
) -> Result<Json<ReminderView>, ApiError>
where
  S: AcademicStore,
{
  body.validate()?;

  let reminder = state
    .store
    .update_reminder(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(reminder_id = %id, "reminder updated");
  Ok(Json(ReminderView::at(reminder, state.clock.now())))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /reminders/{id}`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AcademicStore,
{
  if !state.store.delete_reminder(id).await.map_err(ApiError::store)? {
    return Err(not_found(id));
  }
  tracing::info!(reminder_id = %id, "reminder deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Toggle ───────────────────────────────────────────────────────────────────

/// `PATCH /reminders/{id}/toggle`
pub async fn toggle<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReminderView>, ApiError>
where
  S: AcademicStore,
{
  let reminder = state
    .store
    .toggle_reminder(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  tracing::info!(reminder_id = %id, completed = reminder.completed, "reminder toggled");
  Ok(Json(ReminderView::at(reminder, state.clock.now())))
}
