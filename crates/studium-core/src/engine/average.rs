//! Weighted averages over grades.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  grade::{Grade, MAX_WEIGHT},
};

/// The average reported when there is nothing to average.
pub const EMPTY_AVERAGE: f64 = 0.0;

/// `Σ(value × weight) / Σ(weight)` over `grades`.
///
/// An empty input averages to [`EMPTY_AVERAGE`]. A grade whose weight is not
/// in `(0, MAX_WEIGHT]` fails the whole computation with
/// [`Error::InvalidWeight`]; the caller decides whether to drop the record
/// or give up. The result is always finite: anything else is reported as
/// [`Error::NonFiniteAverage`].
pub fn weighted_average<'a, I>(grades: I) -> Result<f64>
where
  I: IntoIterator<Item = &'a Grade>,
{
  let mut weighted_sum = 0.0;
  let mut total_weight = 0.0;
  let mut count = 0;

  for grade in grades {
    check_weight(grade)?;
    weighted_sum += grade.value * grade.weight;
    total_weight += grade.weight;
    count += 1;
  }

  if count == 0 {
    return Ok(EMPTY_AVERAGE);
  }
  let average = weighted_sum / total_weight;
  if average.is_finite() {
    Ok(average)
  } else {
    Err(Error::NonFiniteAverage { count })
  }
}

fn check_weight(grade: &Grade) -> Result<()> {
  if grade.weight > 0.0 && grade.weight <= MAX_WEIGHT {
    Ok(())
  } else {
    Err(Error::InvalidWeight {
      grade_id: grade.id,
      weight:   grade.weight,
    })
  }
}

// ─── Per subject ─────────────────────────────────────────────────────────────

/// The average of one subject's grades, with the count it was computed from.
///
/// A subject without grades averages to [`EMPTY_AVERAGE`]; check
/// [`SubjectAverage::has_grades`] to tell that apart from a real score of 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectAverage {
  pub subject_id:  Uuid,
  pub average:     f64,
  pub grade_count: usize,
}

impl SubjectAverage {
  pub fn has_grades(&self) -> bool { self.grade_count > 0 }
}

/// Weighted average of the grades in `grades` that belong to `subject_id`.
pub fn subject_average(grades: &[Grade], subject_id: Uuid) -> Result<SubjectAverage> {
  let matching: Vec<&Grade> =
    grades.iter().filter(|g| g.subject_id == subject_id).collect();

  Ok(SubjectAverage {
    subject_id,
    average: weighted_average(matching.iter().copied())?,
    grade_count: matching.len(),
  })
}
