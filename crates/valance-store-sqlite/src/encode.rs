//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed number of
//! fractional digits, so lexical order in SQL equals chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use valance_core::submission::{FormType, Submission, SubmissionStatus};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Raw row types ───────────────────────────────────────────────────────────

pub const SUBMISSION_COLUMNS: &str = "id, name, email, mobile, company, message, \
   form_type, submitted_at, ip_address, status, notes";

/// A `contact_submissions` row before decoding.
pub struct RawSubmission {
  pub id:           i64,
  pub name:         String,
  pub email:        String,
  pub mobile:       Option<String>,
  pub company:      Option<String>,
  pub message:      Option<String>,
  pub form_type:    String,
  pub submitted_at: String,
  pub ip_address:   Option<String>,
  pub status:       String,
  pub notes:        Option<String>,
}

impl RawSubmission {
  /// Read a row selected with [`SUBMISSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      name:         row.get(1)?,
      email:        row.get(2)?,
      mobile:       row.get(3)?,
      company:      row.get(4)?,
      message:      row.get(5)?,
      form_type:    row.get(6)?,
      submitted_at: row.get(7)?,
      ip_address:   row.get(8)?,
      status:       row.get(9)?,
      notes:        row.get(10)?,
    })
  }

  pub fn into_submission(self) -> Result<Submission> {
    Ok(Submission {
      id:           self.id,
      name:         self.name,
      email:        self.email,
      mobile:       self.mobile,
      company:      self.company,
      message:      self.message,
      form_type:    FormType::parse(&self.form_type)?,
      submitted_at: decode_dt(&self.submitted_at)?,
      ip_address:   self.ip_address,
      status:       SubmissionStatus::parse(&self.status)?,
      notes:        self.notes,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let whole = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let later = whole + chrono::Duration::microseconds(500_000);
    let a = encode_dt(whole);
    let b = encode_dt(later);
    assert_eq!(a, "2025-01-01T00:00:00.000000Z");
    assert!(a < b);
    assert_eq!(decode_dt(&b).unwrap(), later);
  }

  #[test]
  fn bad_timestamp_is_reported() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
