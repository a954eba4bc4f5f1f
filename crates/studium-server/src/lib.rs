//! HTTP server for Studium.
//!
//! Mounts the `studium-api` router under `/api` behind bearer-token sessions
//! issued by `/api/auth/login` and `/api/auth/register`, backed by any
//! [`AccountStore`].

pub mod auth;
pub mod error;

pub use error::{ConfigError, Error};

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::post};
use serde::Deserialize;
use studium_api::ApiState;
use studium_core::{
  account::{normalize_email, validate_email},
  clock::{Clock, SystemClock},
  store::AccountStore,
};
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, ConfiguredAccount, SessionRegistry};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STUDIUM_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Operator account; set both or neither.
  #[serde(default)]
  pub account_email:         Option<String>,
  #[serde(default)]
  pub account_password_hash: Option<String>,
  #[serde(default = "default_allow_registration")]
  pub allow_registration:    bool,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours:     i64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3333 }
fn default_allow_registration() -> bool { true }
fn default_session_ttl_hours() -> i64 { 24 }

impl ServerConfig {
  pub fn auth_config(&self) -> Result<AuthConfig, ConfigError> {
    let account = match (&self.account_email, &self.account_password_hash) {
      (Some(email), Some(hash)) => {
        validate_email(email).map_err(|e| ConfigError(format!("account_email: {e}")))?;
        Some(ConfiguredAccount {
          email:         normalize_email(email),
          password_hash: hash.clone(),
        })
      }
      (None, None) => None,
      _ => {
        return Err(ConfigError(
          "account_email and account_password_hash must be set together".into(),
        ));
      }
    };

    if account.is_none() && !self.allow_registration {
      return Err(ConfigError(
        "no configured account and registration is disabled; nobody could sign in".into(),
      ));
    }

    let session_ttl = (self.session_ttl_hours >= 1)
      .then(|| chrono::Duration::try_hours(self.session_ttl_hours))
      .flatten()
      .ok_or_else(|| {
        ConfigError(format!(
          "session_ttl_hours must be a positive number of hours, got {}",
          self.session_ttl_hours
        ))
      })?;

    Ok(AuthConfig {
      account,
      allow_registration: self.allow_registration,
      session_ttl,
    })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the auth handlers and session guard.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub auth:     Arc<AuthConfig>,
  pub sessions: Arc<SessionRegistry>,
  pub clock:    Arc<dyn Clock>,
}

impl<S> AppState<S> {
  pub fn new(store: S, config: &ServerConfig) -> Result<Self, ConfigError> {
    Ok(Self {
      store:    Arc::new(store),
      auth:     Arc::new(config.auth_config()?),
      sessions: Arc::new(SessionRegistry::new()),
      clock:    Arc::new(SystemClock),
    })
  }

  pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      auth:     Arc::clone(&self.auth),
      sessions: Arc::clone(&self.sessions),
      clock:    Arc::clone(&self.clock),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AccountStore + 'static,
{
  let api_state = ApiState {
    store: Arc::clone(&state.store),
    clock: Arc::clone(&state.clock),
  };

  let protected = studium_api::api_router(api_state).route_layer(
    middleware::from_fn_with_state(state.clone(), auth::require_session::<S>),
  );

  let public = Router::new()
    .route("/auth/login",    post(auth::login::<S>))
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/logout",   post(auth::logout::<S>))
    .with_state(state);

  Router::new()
    .nest("/api", public.merge(protected))
    .layer(TraceLayer::new_for_http())
}
