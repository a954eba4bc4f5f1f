//! A deterministic performance report: which subjects are going well and
//! which need attention.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  engine::{average::weighted_average, category::Category, grouping::group_by_subject},
  grade::Grade,
  subject::Subject,
};

/// How one graded subject stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStanding {
  pub subject:     Subject,
  pub average:     f64,
  pub grade_count: usize,
  pub category:    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
  pub overall_average:  f64,
  /// `None` when no grades have been recorded.
  pub overall_category: Option<Category>,
  /// Every graded subject, best average first. Ties keep subject order.
  pub standings:        Vec<SubjectStanding>,
  /// Standings in [`Category::Good`], best first.
  pub strengths:        Vec<SubjectStanding>,
  /// Standings below [`Category::Good`], weakest first.
  pub needs_attention:  Vec<SubjectStanding>,
}

impl PerformanceReport {
  pub fn build(subjects: &[Subject], grades: &[Grade]) -> Result<Self> {
    let overall_average = weighted_average(grades)?;

    let mut standings: Vec<SubjectStanding> = group_by_subject(subjects, grades)?
      .into_iter()
      .map(|entry| SubjectStanding {
        category:    Category::of(entry.average),
        grade_count: entry.grades.len(),
        average:     entry.average,
        subject:     entry.subject,
      })
      .collect();
    standings.sort_by(|a, b| b.average.total_cmp(&a.average));

    let strengths: Vec<SubjectStanding> = standings
      .iter()
      .filter(|s| s.category == Category::Good)
      .cloned()
      .collect();

    let mut needs_attention: Vec<SubjectStanding> = standings
      .iter()
      .filter(|s| s.category != Category::Good)
      .cloned()
      .collect();
    needs_attention.sort_by(|a, b| a.average.total_cmp(&b.average));

    Ok(Self {
      overall_average,
      overall_category: (!grades.is_empty())
        .then(|| Category::of(overall_average)),
      standings,
      strengths,
      needs_attention,
    })
  }

  /// The subject with the highest average, if any subject is graded.
  pub fn strongest(&self) -> Option<&SubjectStanding> { self.standings.first() }

  /// The subject with the lowest average, if any subject is graded.
  pub fn weakest(&self) -> Option<&SubjectStanding> { self.standings.last() }
}
