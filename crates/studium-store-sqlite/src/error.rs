//! Error type for `studium-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Core(#[from] studium_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A grade or reminder referenced a subject that is not in the store.
  #[error("subject not found: {0}")]
  SubjectNotFound(uuid::Uuid),
}

impl studium_core::store::StoreError for Error {
  fn is_rejection(&self) -> bool {
    matches!(self, Error::Core(_) | Error::SubjectNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
