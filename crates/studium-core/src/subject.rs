//! Subject: a course the student follows. Grades and reminders point at it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A course, identified by a store-assigned UUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:          Uuid,
  pub name:        String,
  pub description: Option<String>,
}

/// The mutable fields of a [`Subject`]. Used both to create a subject and to
/// replace an existing one's fields on edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubject {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
}

impl NewSubject {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:        name.into(),
      description: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName("subject"));
    }
    Ok(())
  }
}
