//! Performance categories.
//!
//! There is exactly one threshold table, shared by individual grade values
//! and every kind of average.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Lowest score counted as [`Category::Good`].
pub const GOOD_THRESHOLD: f64 = 7.0;
/// Lowest score counted as [`Category::Warning`].
pub const WARNING_THRESHOLD: f64 = 5.0;

/// How a score compares against the passing thresholds, best first.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
  /// `score >= 7.0`
  Good,
  /// `5.0 <= score < 7.0`
  Warning,
  /// `score < 5.0`
  Critical,
}

impl Category {
  /// Categorise a grade value or an average. Each band includes its lower
  /// bound.
  pub fn of(score: f64) -> Self {
    if score >= GOOD_THRESHOLD {
      Self::Good
    } else if score >= WARNING_THRESHOLD {
      Self::Warning
    } else {
      Self::Critical
    }
  }
}
