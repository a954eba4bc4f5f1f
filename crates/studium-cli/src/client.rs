//! Async HTTP client wrapping the Studium JSON API.

use std::{fmt, time::Duration};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use studium_core::{
  engine::{GradesBySubject, PerformanceReport, SubjectAverage},
  grade::{Grade, NewGrade},
  reminder::{NewReminder, Reminder},
  subject::{NewSubject, Subject},
};
use uuid::Uuid;

/// The server rejected our token: it is missing, revoked, or expired.
#[derive(Debug)]
pub struct SessionExpired;

impl fmt::Display for SessionExpired {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("session expired or invalid")
  }
}

impl std::error::Error for SessionExpired {}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
  email:    &'a str,
  password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
  name:     &'a str,
  email:    &'a str,
  password: &'a str,
}

/// Body of a successful `POST /api/auth/login` or `/api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
  pub token:      String,
  pub email:      String,
  #[serde(default)]
  pub name:       Option<String>,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the Studium JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.into(),
      token,
    })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send `req` and check the status, mapping `401` to [`SessionExpired`]
  /// and other failures to the server's `{"error": …}` message.
  async fn dispatch(&self, req: RequestBuilder, what: &str) -> Result<reqwest::Response> {
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;

    if resp.status() == StatusCode::UNAUTHORIZED {
      return Err(SessionExpired.into());
    }
    check(resp, what).await
  }

  async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    self
      .dispatch(req, what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising response to {what}"))
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/login`
  pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&LoginRequest { email, password })
      .send()
      .await
      .context("POST /auth/login failed")?;

    if resp.status() == StatusCode::UNAUTHORIZED {
      return Err(anyhow!("invalid email or password"));
    }
    check(resp, "POST /auth/login")
      .await?
      .json()
      .await
      .context("deserialising login response")
  }

  /// `POST /api/auth/register`
  pub async fn register(
    &self,
    name: &str,
    email: &str,
    password: &str,
  ) -> Result<LoginResponse> {
    let resp = self
      .client
      .post(self.url("/auth/register"))
      .json(&RegisterRequest { name, email, password })
      .send()
      .await
      .context("POST /auth/register failed")?;

    check(resp, "POST /auth/register")
      .await?
      .json()
      .await
      .context("deserialising registration response")
  }

  /// `POST /api/auth/logout`
  pub async fn logout(&self) -> Result<()> {
    self
      .dispatch(self.client.post(self.url("/auth/logout")), "POST /auth/logout")
      .await?;
    Ok(())
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  /// `GET /api/subjects`
  pub async fn list_subjects(&self) -> Result<Vec<Subject>> {
    self
      .fetch(self.client.get(self.url("/subjects")), "GET /subjects")
      .await
  }

  /// `POST /api/subjects`
  pub async fn create_subject(&self, input: &NewSubject) -> Result<Subject> {
    self
      .fetch(self.client.post(self.url("/subjects")).json(input), "POST /subjects")
      .await
  }

  /// `PUT /api/subjects/{id}`
  pub async fn update_subject(&self, id: Uuid, input: &NewSubject) -> Result<Subject> {
    self
      .fetch(
        self.client.put(self.url(&format!("/subjects/{id}"))).json(input),
        "PUT /subjects",
      )
      .await
  }

  /// `DELETE /api/subjects/{id}`
  pub async fn delete_subject(&self, id: Uuid) -> Result<()> {
    self
      .dispatch(
        self.client.delete(self.url(&format!("/subjects/{id}"))),
        "DELETE /subjects",
      )
      .await?;
    Ok(())
  }

  /// `GET /api/subjects/{id}/average`
  pub async fn subject_average(&self, id: Uuid) -> Result<SubjectAverage> {
    self
      .fetch(
        self.client.get(self.url(&format!("/subjects/{id}/average"))),
        "GET /subjects/average",
      )
      .await
  }

  // ── Grades ────────────────────────────────────────────────────────────────

  /// `GET /api/grades[?subject_id=<id>]`
  pub async fn list_grades(&self, subject_id: Option<Uuid>) -> Result<Vec<Grade>> {
    let mut req = self.client.get(self.url("/grades"));
    if let Some(id) = subject_id {
      req = req.query(&[("subject_id", id.to_string())]);
    }
    self.fetch(req, "GET /grades").await
  }

  /// `GET /api/grades/by-subject`
  pub async fn grades_by_subject(&self) -> Result<GradesBySubject> {
    self
      .fetch(self.client.get(self.url("/grades/by-subject")), "GET /grades/by-subject")
      .await
  }

  /// `POST /api/grades`
  pub async fn create_grade(&self, input: &NewGrade) -> Result<Grade> {
    self
      .fetch(self.client.post(self.url("/grades")).json(input), "POST /grades")
      .await
  }

  /// `PUT /api/grades/{id}`
  pub async fn update_grade(&self, id: Uuid, input: &NewGrade) -> Result<Grade> {
    self
      .fetch(
        self.client.put(self.url(&format!("/grades/{id}"))).json(input),
        "PUT /grades",
      )
      .await
  }

  /// `DELETE /api/grades/{id}`
  pub async fn delete_grade(&self, id: Uuid) -> Result<()> {
    self
      .dispatch(
        self.client.delete(self.url(&format!("/grades/{id}"))),
        "DELETE /grades",
      )
      .await?;
    Ok(())
  }

  // ── Reminders ─────────────────────────────────────────────────────────────

  /// `GET /api/reminders[?completed=<bool>]`
  pub async fn list_reminders(&self, completed: Option<bool>) -> Result<Vec<Reminder>> {
    let mut req = self.client.get(self.url("/reminders"));
    if let Some(completed) = completed {
      req = req.query(&[("completed", completed.to_string())]);
    }
    self.fetch(req, "GET /reminders").await
  }

  /// `POST /api/reminders`
  pub async fn create_reminder(&self, input: &NewReminder) -> Result<Reminder> {
    self
      .fetch(self.client.post(self.url("/reminders")).json(input), "POST /reminders")
      .await
  }

  /// `PUT /api/reminders/{id}`
  pub async fn update_reminder(&self, id: Uuid, input: &NewReminder) -> Result<Reminder> {
    self
      .fetch(
        self.client.put(self.url(&format!("/reminders/{id}"))).json(input),
        "PUT /reminders",
      )
      .await
  }

  /// `PATCH /api/reminders/{id}/toggle`
  pub async fn toggle_reminder(&self, id: Uuid) -> Result<Reminder> {
    self
      .fetch(
        self.client.patch(self.url(&format!("/reminders/{id}/toggle"))),
        "PATCH /reminders/toggle",
      )
      .await
  }

  /// `DELETE /api/reminders/{id}`
  pub async fn delete_reminder(&self, id: Uuid) -> Result<()> {
    self
      .dispatch(
        self.client.delete(self.url(&format!("/reminders/{id}"))),
        "DELETE /reminders",
      )
      .await?;
    Ok(())
  }

  // ── Summaries ─────────────────────────────────────────────────────────────

  /// `GET /api/report`
  pub async fn report(&self) -> Result<PerformanceReport> {
    self
      .fetch(self.client.get(self.url("/report")), "GET /report")
      .await
  }
}

/// Pass a successful response through; turn anything else into the server's
/// `{"error": …}` message.
async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let detail = resp
    .json::<ErrorBody>()
    .await
    .map(|b| b.error)
    .unwrap_or_else(|_| status.to_string());
  Err(anyhow!("{what} → {status}: {detail}"))
}
