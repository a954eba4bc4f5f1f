//! Grade: one weighted assessment result within a subject.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, engine::category::Category};

/// Lowest value on the grading scale.
pub const MIN_VALUE: f64 = 0.0;
/// Highest value on the grading scale.
pub const MAX_VALUE: f64 = 10.0;
/// Largest weight a single grade may carry.
pub const MAX_WEIGHT: f64 = 100.0;

/// A recorded assessment result.
///
/// `subject_id` is a plain reference; whoever writes a grade is responsible
/// for checking that the subject exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
  pub id:         Uuid,
  pub subject_id: Uuid,
  /// Label for the assessment, e.g. "Midterm" or "Project".
  pub name:       String,
  /// Score on the `0..=10` scale.
  pub value:      f64,
  /// Relative weight inside any average this grade takes part in.
  pub weight:     f64,
}

impl Grade {
  /// The performance category of this single result.
  pub fn category(&self) -> Category { Category::of(self.value) }
}

fn default_weight() -> f64 { 1.0 }

/// The mutable fields of a [`Grade`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGrade {
  pub subject_id: Uuid,
  pub name:       String,
  pub value:      f64,
  #[serde(default = "default_weight")]
  pub weight:     f64,
}

impl NewGrade {
  pub fn new(
    subject_id: Uuid,
    name: impl Into<String>,
    value: f64,
    weight: f64,
  ) -> Self {
    Self {
      subject_id,
      name: name.into(),
      value,
      weight,
    }
  }

  /// Reject input that would corrupt later aggregation: blank names, values
  /// off the scale, and weights outside `(0, MAX_WEIGHT]`.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName("grade"));
    }
    if !(MIN_VALUE..=MAX_VALUE).contains(&self.value) {
      return Err(Error::ValueOutOfRange(self.value));
    }
    if !(self.weight > 0.0 && self.weight.is_finite()) {
      return Err(Error::NonPositiveWeight(self.weight));
    }
    if self.weight > MAX_WEIGHT {
      return Err(Error::WeightTooLarge(self.weight));
    }
    Ok(())
  }
}
