//! Account: someone allowed to sign in to a Studium server.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

/// A registered account. The password is only ever held as an argon2 PHC
/// string, and the type is not serialisable so the hash cannot leak into a
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
  pub id:            Uuid,
  pub name:          String,
  /// Always stored in [`normalize_email`] form.
  pub email:         String,
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input for a new account. The caller hashes the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
}

impl NewAccount {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName("account"));
    }
    validate_email(&self.email)
  }
}

/// Emails compare case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String { email.trim().to_ascii_lowercase() }

/// A deliberately loose shape check: one `@` with something on either side.
pub fn validate_email(email: &str) -> Result<()> {
  let email = email.trim();
  match email.split_once('@') {
    Some((local, domain))
      if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
    {
      Ok(())
    }
    _ => Err(Error::InvalidEmail(email.to_string())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn account(name: &str, email: &str) -> NewAccount {
    NewAccount {
      name:          name.into(),
      email:         email.into(),
      password_hash: "$argon2id$v=19$stub".into(),
    }
  }

  #[test]
  fn accepts_ordinary_address() {
    assert!(account("Ana", "ana@example.com").validate().is_ok());
  }

  #[test]
  fn rejects_malformed_addresses() {
    for email in ["", "ana", "@example.com", "ana@", "a@b@c"] {
      assert!(
        matches!(account("Ana", email).validate(), Err(Error::InvalidEmail(_))),
        "{email:?} accepted"
      );
    }
  }

  #[test]
  fn rejects_blank_name() {
    assert!(matches!(
      account(" ", "ana@example.com").validate(),
      Err(Error::EmptyName("account"))
    ));
  }

  #[test]
  fn normalisation() {
    assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
  }
}
