//! Error types for `studium-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A stored grade carries a weight that cannot take part in an average.
  #[error("grade {grade_id} has invalid weight {weight}; weights must be in (0, {max}]", max = crate::grade::MAX_WEIGHT)]
  InvalidWeight { grade_id: Uuid, weight: f64 },

  #[error("weight must be a positive number, got {0}")]
  NonPositiveWeight(f64),

  #[error("weight {0} is above the maximum of {max}", max = crate::grade::MAX_WEIGHT)]
  WeightTooLarge(f64),

  /// The grades were individually acceptable but their average is not a
  /// finite number.
  #[error("average over {count} grade(s) is not a finite number")]
  NonFiniteAverage { count: usize },

  #[error("grade value {0} is outside the 0..=10 scale")]
  ValueOutOfRange(f64),

  #[error("{0} name must not be empty")]
  EmptyName(&'static str),

  #[error("{0:?} is not an email address")]
  InvalidEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
