//! The cached sign-in, stored as TOML between invocations.

use std::{
  fs,
  io::Write as _,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::SessionExpired;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
  /// Server the token was issued by.
  pub url:        String,
  pub email:      String,
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

impl Credentials {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }

  /// `Ok(None)` when no credentials have been saved yet.
  pub fn load(path: &Path) -> Result<Option<Self>> {
    let raw = match fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(e).with_context(|| format!("reading {}", path.display()));
      }
    };
    let creds = toml::from_str(&raw)
      .with_context(|| format!("parsing credentials file {}", path.display()))?;
    Ok(Some(creds))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
      fs::create_dir_all(dir)
        .with_context(|| format!("creating {}", dir.display()))?;
    }
    let raw = toml::to_string_pretty(self).context("serialising credentials")?;
    let mut file = private_file(path)
      .with_context(|| format!("opening {}", path.display()))?;
    file
      .write_all(raw.as_bytes())
      .with_context(|| format!("writing {}", path.display()))
  }

  /// Returns `true` if a file was removed.
  pub fn remove(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
  }
}

/// `$HOME/.config/studium/credentials.toml`
pub fn default_path() -> Result<PathBuf> {
  let home = std::env::var_os("HOME")
    .ok_or_else(|| anyhow!("HOME is not set; pass --credentials"))?;
  Ok(
    PathBuf::from(home)
      .join(".config")
      .join("studium")
      .join("credentials.toml"),
  )
}

/// When `err` is a rejected session, delete the cached sign-in and return
/// `true`.
pub fn forget_if_expired(err: &anyhow::Error, path: &Path) -> Result<bool> {
  if !err.is::<SessionExpired>() {
    return Ok(false);
  }
  Credentials::remove(path)?;
  Ok(true)
}

/// Truncate or create `path`, readable by the owner only from the moment it
/// exists. A file left over with wider permissions is narrowed first.
#[cfg(unix)]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
  use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
  if path.exists() {
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
  }
  fs::OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(true)
    .mode(0o600)
    .open(path)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> std::io::Result<fs::File> {
  fs::OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(true)
    .open(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn scratch() -> PathBuf {
    std::env::temp_dir()
      .join(format!("studium-cli-{}", uuid::Uuid::new_v4()))
      .join("credentials.toml")
  }

  fn sample() -> Credentials {
    Credentials {
      url:        "http://localhost:3333".into(),
      email:      "student@example.com".into(),
      token:      "ab".repeat(32),
      expires_at: Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap(),
    }
  }

  #[test]
  fn missing_file_is_none() {
    assert!(Credentials::load(&scratch()).unwrap().is_none());
  }

  #[test]
  fn save_load_remove() {
    let path = scratch();
    let creds = sample();
    creds.save(&path).unwrap();

    assert_eq!(Credentials::load(&path).unwrap(), Some(creds));
    assert!(Credentials::remove(&path).unwrap());
    assert!(!Credentials::remove(&path).unwrap());
    assert!(Credentials::load(&path).unwrap().is_none());

    fs::remove_dir(path.parent().unwrap()).ok();
  }

  #[test]
  fn garbage_file_is_an_error() {
    let path = scratch();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "token = ").unwrap();
    assert!(Credentials::load(&path).is_err());
    fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[cfg(unix)]
  #[test]
  fn saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let path = scratch();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "stale").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    sample().save(&path).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(Credentials::load(&path).unwrap(), Some(sample()));

    fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[test]
  fn rejected_session_forgets_credentials() {
    let path = scratch();
    sample().save(&path).unwrap();

    let other = anyhow!("GET /grades → 500 Internal Server Error: boom");
    assert!(!forget_if_expired(&other, &path).unwrap());
    assert!(path.exists());

    let expired = anyhow::Error::from(SessionExpired);
    assert!(forget_if_expired(&expired, &path).unwrap());
    assert!(!path.exists());

    assert!(forget_if_expired(&expired, &path).unwrap());
    fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[test]
  fn expiry() {
    let creds = sample();
    assert!(!creds.is_expired(creds.expires_at - chrono::Duration::seconds(1)));
    assert!(creds.is_expired(creds.expires_at));
  }
}
