//! Parsing of due dates typed on the command line.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Parse a due date.
///
/// Accepts RFC 3339, or a local `YYYY-MM-DD HH:MM`. A bare `YYYY-MM-DD`
/// means 23:59 local time on that day.
pub fn parse_due(input: &str) -> Result<DateTime<Utc>> {
  let input = input.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
    return Ok(dt.with_timezone(&Utc));
  }

  let naive = DATE_TIME_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    .or_else(|| {
      NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| NaiveTime::from_hms_opt(23, 59, 0).map(|t| d.and_time(t)))
    })
    .ok_or_else(|| {
      anyhow!("cannot read {input:?} as a date; use YYYY-MM-DD or YYYY-MM-DD HH:MM")
    })?;

  Local
    .from_local_datetime(&naive)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
    .ok_or_else(|| anyhow!("{input:?} does not exist in the local time zone"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Timelike;

  #[test]
  fn rfc3339_is_taken_as_is() {
    let due = parse_due("2025-03-15T23:59:00Z").unwrap();
    assert_eq!(due, Utc.with_ymd_and_hms(2025, 3, 15, 23, 59, 0).unwrap());

    let offset = parse_due("2025-03-15T20:00:00-03:00").unwrap();
    assert_eq!(offset, Utc.with_ymd_and_hms(2025, 3, 15, 23, 0, 0).unwrap());
  }

  #[test]
  fn local_date_time() {
    let due = parse_due("2025-03-15 14:30").unwrap().with_timezone(&Local);
    assert_eq!((due.hour(), due.minute()), (14, 30));
    assert_eq!(due.date_naive(), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
  }

  #[test]
  fn bare_date_is_end_of_day() {
    let due = parse_due("2025-03-15").unwrap().with_timezone(&Local);
    assert_eq!((due.hour(), due.minute()), (23, 59));
  }

  #[test]
  fn garbage_is_rejected() {
    assert!(parse_due("next friday").is_err());
    assert!(parse_due("2025-13-01").is_err());
    assert!(parse_due("").is_err());
  }
}
