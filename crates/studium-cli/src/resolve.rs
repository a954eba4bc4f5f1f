//! Turning what the user typed into a concrete record.
//!
//! Records are addressed by full UUID or by a unique prefix of one (the
//! listings print the first eight characters). Subjects may also be named,
//! exactly or fuzzily.

use anyhow::{Result, anyhow, bail};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use studium_core::subject::Subject;
use uuid::Uuid;

/// Length of the id prefix shown in listings.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: Uuid) -> String {
  id.to_string()[..SHORT_ID_LEN].to_string()
}

/// Find the single item whose id is `query` or starts with it.
pub fn by_id<'a, T>(
  items: &'a [T],
  id_of: impl Fn(&T) -> Uuid,
  query: &str,
  kind: &str,
) -> Result<&'a T> {
  let query = query.trim().to_ascii_lowercase();
  if query.is_empty() {
    bail!("empty {kind} id");
  }
  if let Ok(id) = Uuid::parse_str(&query) {
    return items
      .iter()
      .find(|item| id_of(*item) == id)
      .ok_or_else(|| anyhow!("no {kind} with id {id}"));
  }

  let mut matches = items
    .iter()
    .filter(|item| id_of(*item).to_string().starts_with(&query));
  match (matches.next(), matches.next()) {
    (Some(item), None) => Ok(item),
    (None, _) => Err(anyhow!("no {kind} with id starting {query:?}")),
    (Some(_), Some(_)) => Err(anyhow!("{kind} id {query:?} is ambiguous; type more of it")),
  }
}

/// Resolve a subject by id, id prefix, exact name, or fuzzy name.
pub fn subject<'a>(subjects: &'a [Subject], query: &str) -> Result<&'a Subject> {
  if let Ok(found) = by_id(subjects, |s| s.id, query, "subject") {
    return Ok(found);
  }

  let needle = query.trim();
  if let Some(found) = subjects
    .iter()
    .find(|s| s.name.eq_ignore_ascii_case(needle))
  {
    return Ok(found);
  }

  let matcher = SkimMatcherV2::default();
  let mut scored: Vec<(i64, &Subject)> = subjects
    .iter()
    .filter_map(|s| matcher.fuzzy_match(&s.name, needle).map(|score| (score, s)))
    .collect();
  scored.sort_by(|a, b| b.0.cmp(&a.0));

  match scored.as_slice() {
    [] => Err(anyhow!("no subject matches {needle:?}")),
    [(_, only)] => Ok(*only),
    [(best, s), (next, _), ..] if best > next => Ok(*s),
    candidates => {
      let names: Vec<&str> = candidates
        .iter()
        .take_while(|(score, _)| *score == candidates[0].0)
        .map(|(_, s)| s.name.as_str())
        .collect();
      Err(anyhow!(
        "{needle:?} matches several subjects: {}",
        names.join(", ")
      ))
    }
  }
}
