//! Accounts and bearer-token sessions: registration, sign-in, sign-out, and
//! the guard for `/api` routes.

use std::{
  collections::HashMap,
  sync::{Mutex, PoisonError},
};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  Json,
  extract::{Request, State},
  http::{HeaderMap, StatusCode, header},
  middleware::Next,
  response::Response,
};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use studium_core::{
  account::{NewAccount, normalize_email},
  store::{AccountStore, StoreError},
};

use crate::{AppState, error::Error};

/// The operator account named in the config file.
#[derive(Clone)]
pub struct ConfiguredAccount {
  /// Stored in `normalize_email` form.
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// How this server instance lets people in.
#[derive(Clone)]
pub struct AuthConfig {
  /// Checked before the stored accounts.
  pub account:            Option<ConfiguredAccount>,
  pub allow_registration: bool,
  pub session_ttl:        Duration,
}

impl AuthConfig {
  /// The configured account, if `email` names it.
  pub fn configured(&self, email: &str) -> Option<&ConfiguredAccount> {
    let email = normalize_email(email);
    self.account.as_ref().filter(|a| a.email == email)
  }
}

/// Check `password` against an argon2 PHC string.
pub fn verify_password(password_hash: &str, password: &str) -> Result<(), Error> {
  let parsed_hash = PasswordHash::new(password_hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)
}

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      tracing::error!(error = %e, "password hashing failed");
      Error::Internal(format!("argon2: {e}"))
    })
}

/// Pull the token out of an `Authorization: Bearer …` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or(Error::Unauthorized)
}

fn store_failure<E: StoreError>(e: E) -> Error {
  if e.is_rejection() {
    Error::BadRequest(e.to_string())
  } else {
    tracing::error!(error = %e, "account store failure");
    Error::Internal(e.to_string())
  }
}

// ─── Sessions ─────────────────────────────────────────────────────────────────

struct Session {
  email:      String,
  expires_at: DateTime<Utc>,
}

/// A freshly issued session token. The raw token is only ever seen here.
#[derive(Debug, Clone)]
pub struct IssuedToken {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// In-memory session table keyed by the SHA-256 digest of each token.
///
/// Sessions do not survive a restart.
#[derive(Default)]
pub struct SessionRegistry {
  sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
  pub fn new() -> Self { Self::default() }

  pub fn issue(&self, email: &str, now: DateTime<Utc>, ttl: Duration) -> IssuedToken {
    let token = generate_token();
    let expires_at = now + ttl;
    let mut sessions = self.lock();
    sessions.retain(|_, s| s.expires_at > now);
    sessions.insert(digest(&token), Session {
      email: email.to_owned(),
      expires_at,
    });
    IssuedToken { token, expires_at }
  }

  /// Email of the session owning `token`, if it exists and has not expired.
  /// Expired sessions are dropped on lookup.
  pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
    let key = digest(token);
    let mut sessions = self.lock();
    match sessions.get(&key) {
      Some(s) if s.expires_at > now => Some(s.email.clone()),
      Some(_) => {
        sessions.remove(&key);
        None
      }
      None => None,
    }
  }

  /// Returns `true` if a session was removed.
  pub fn revoke(&self, token: &str) -> bool {
    self.lock().remove(&digest(token)).is_some()
  }

  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

fn digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
  pub name:     String,
  pub email:    String,
  pub password: String,
}

/// Body of a successful sign-in or registration.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:      String,
  pub email:      String,
  /// Absent for the configured account, which has no display name.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name:       Option<String>,
  pub expires_at: DateTime<Utc>,
}

/// An account matched by email, before its password is checked.
struct Identity {
  email:         String,
  name:          Option<String>,
  password_hash: String,
}

async fn identify<S>(state: &AppState<S>, email: &str) -> Result<Option<Identity>, Error>
where
  S: AccountStore,
{
  if let Some(account) = state.auth.configured(email) {
    return Ok(Some(Identity {
      email:         account.email.clone(),
      name:          None,
      password_hash: account.password_hash.clone(),
    }));
  }
  let stored = state.store.find_account(email).await.map_err(store_failure)?;
  Ok(stored.map(|a| Identity {
    email:         a.email,
    name:          Some(a.name),
    password_hash: a.password_hash,
  }))
}

fn open_session<S>(state: &AppState<S>, email: String, name: Option<String>) -> LoginResponse {
  let issued = state
    .sessions
    .issue(&email, state.clock.now(), state.auth.session_ttl);
  tracing::info!(%email, expires_at = %issued.expires_at, "session opened");
  LoginResponse {
    token: issued.token,
    email,
    name,
    expires_at: issued.expires_at,
  }
}

pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Error>
where
  S: AccountStore + 'static,
{
  if body.email.trim().is_empty() || body.password.is_empty() {
    return Err(Error::BadRequest("email and password are required".into()));
  }

  let identity = identify(&state, &body.email).await?;
  let verified = identity
    .filter(|id| verify_password(&id.password_hash, &body.password).is_ok());
  let Some(identity) = verified else {
    tracing::warn!(email = %body.email, "rejected sign-in");
    return Err(Error::Unauthorized);
  };

  Ok(Json(open_session(&state, identity.email, identity.name)))
}

/// `POST /api/auth/register`: create an account and sign it in.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), Error>
where
  S: AccountStore + 'static,
{
  if !state.auth.allow_registration {
    return Err(Error::Forbidden("registration is disabled on this server".into()));
  }
  if body.password.is_empty() {
    return Err(Error::BadRequest("name, email and password are required".into()));
  }

  let mut input = NewAccount {
    name:          body.name,
    email:         body.email,
    password_hash: String::new(),
  };
  input
    .validate()
    .map_err(|e| Error::BadRequest(e.to_string()))?;

  let email = normalize_email(&input.email);
  let taken = || Error::Conflict(format!("{email} is already registered"));
  if state.auth.configured(&email).is_some() {
    return Err(taken());
  }

  input.password_hash = hash_password(&body.password)?;
  let account = state
    .store
    .add_account(input)
    .await
    .map_err(store_failure)?
    .ok_or_else(taken)?;
  tracing::info!(account_id = %account.id, email = %account.email, "account registered");

  Ok((
    StatusCode::CREATED,
    Json(open_session(&state, account.email, Some(account.name))),
  ))
}

pub async fn logout<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<StatusCode, Error>
where
  S: AccountStore + 'static,
{
  let token = bearer_token(&headers)?;
  if !state.sessions.revoke(token) {
    return Err(Error::Unauthorized);
  }
  tracing::info!("session closed");
  Ok(StatusCode::NO_CONTENT)
}

/// Middleware rejecting requests without a live session.
pub async fn require_session<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: AccountStore + 'static,
{
  let token = bearer_token(req.headers())?;
  let Some(email) = state.sessions.resolve(token, state.clock.now()) else {
    tracing::warn!(path = %req.uri().path(), "request with unknown or expired token");
    return Err(Error::Unauthorized);
  };
  tracing::debug!(%email, "session accepted");
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;
  use chrono::TimeZone;

  fn config(password: &str) -> AuthConfig {
    AuthConfig {
      account:            Some(ConfiguredAccount {
        email:         "student@example.com".to_string(),
        password_hash: hash_password(password).unwrap(),
      }),
      allow_registration: true,
      session_ttl:        Duration::hours(24),
    }
  }

  fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 8, 12, 0, 0).unwrap()
  }

  #[test]
  fn hashed_password_verifies() {
    let hash = hash_password("secret").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "secret").is_ok());
    assert!(matches!(verify_password(&hash, "wrong"), Err(Error::Unauthorized)));
  }

  #[test]
  fn configured_account_matches_case_insensitively() {
    let cfg = config("secret");
    assert!(cfg.configured("student@example.com").is_some());
    assert!(cfg.configured(" Student@Example.com ").is_some());
    assert!(cfg.configured("someone@example.com").is_none());
  }

  #[test]
  fn malformed_hash_never_verifies() {
    assert!(verify_password("not-a-phc-string", "secret").is_err());
  }

  #[test]
  fn bearer_header_parsing() {
    let mut headers = HeaderMap::new();
    assert!(bearer_token(&headers).is_err());

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert!(bearer_token(&headers).is_err());

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert!(bearer_token(&headers).is_err());

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
    assert_eq!(bearer_token(&headers).unwrap(), "abc123");
  }

  #[test]
  fn tokens_are_random_hex() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
  }

  #[test]
  fn session_lifecycle() {
    let registry = SessionRegistry::new();
    let issued = registry.issue("student@example.com", t0(), Duration::hours(1));
    assert_eq!(issued.expires_at, t0() + Duration::hours(1));

    assert_eq!(
      registry.resolve(&issued.token, t0() + Duration::minutes(59)).as_deref(),
      Some("student@example.com")
    );
    assert!(registry.resolve("forged", t0()).is_none());

    assert!(registry.revoke(&issued.token));
    assert!(!registry.revoke(&issued.token));
    assert!(registry.resolve(&issued.token, t0()).is_none());
  }

  #[test]
  fn expired_session_is_dropped() {
    let registry = SessionRegistry::new();
    let issued = registry.issue("student@example.com", t0(), Duration::hours(1));
    assert!(registry.resolve(&issued.token, t0() + Duration::hours(1)).is_none());
    assert!(registry.is_empty());
  }

  #[test]
  fn raw_tokens_are_not_stored() {
    let registry = SessionRegistry::new();
    let issued = registry.issue("student@example.com", t0(), Duration::hours(1));
    assert!(!registry.lock().contains_key(&issued.token));
    assert!(registry.lock().contains_key(&digest(&issued.token)));
  }
}
