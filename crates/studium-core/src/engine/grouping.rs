//! Grades grouped under their subject.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  engine::average::weighted_average,
  grade::Grade,
  subject::Subject,
};

/// One subject together with its grades and their weighted average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrades {
  pub subject: Subject,
  /// In the order they appeared in the input.
  pub grades:  Vec<Grade>,
  pub average: f64,
}

/// Subject-keyed grade groups in input subject order.
///
/// Only subjects that have at least one grade appear. Serialises as a plain
/// JSON array so the order survives the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradesBySubject {
  entries: Vec<SubjectGrades>,
}

impl GradesBySubject {
  /// Look up the group for `subject_id`.
  pub fn get(&self, subject_id: Uuid) -> Option<&SubjectGrades> {
    self.entries.iter().find(|e| e.subject.id == subject_id)
  }

  pub fn contains(&self, subject_id: Uuid) -> bool {
    self.get(subject_id).is_some()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, SubjectGrades> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<'a> IntoIterator for &'a GradesBySubject {
  type Item = &'a SubjectGrades;
  type IntoIter = std::slice::Iter<'a, SubjectGrades>;

  fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

impl IntoIterator for GradesBySubject {
  type Item = SubjectGrades;
  type IntoIter = std::vec::IntoIter<SubjectGrades>;

  fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}

/// Group `grades` under the entries of `subjects`.
///
/// Subjects without grades are left out, and grades whose subject is not in
/// `subjects` are ignored. Any invalid weight among the grouped grades fails
/// the whole grouping.
pub fn group_by_subject(
  subjects: &[Subject],
  grades: &[Grade],
) -> Result<GradesBySubject> {
  let mut entries = Vec::new();

  for subject in subjects {
    let subject_grades: Vec<Grade> = grades
      .iter()
      .filter(|g| g.subject_id == subject.id)
      .cloned()
      .collect();
    if subject_grades.is_empty() {
      continue;
    }

    let average = weighted_average(&subject_grades)?;
    entries.push(SubjectGrades {
      subject: subject.clone(),
      grades: subject_grades,
      average,
    });
  }

  Ok(GradesBySubject { entries })
}
