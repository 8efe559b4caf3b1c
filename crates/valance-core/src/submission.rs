//! Submission: one persisted contact-form or newsletter event.
//!
//! A submission is written once by the intake path. Afterwards only its
//! `status` (and the reserved `notes` column) may change.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Messages longer than this are truncated in list views.
pub const LIST_MESSAGE_LIMIT: usize = 50;

// ─── Form type ───────────────────────────────────────────────────────────────

/// Which form produced a submission; inferred from the submitted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormType {
  #[serde(rename = "Contact Form")]
  ContactForm,
  #[serde(rename = "Newsletter")]
  Newsletter,
}

impl FormType {
  pub fn as_str(self) -> &'static str {
    match self {
      FormType::ContactForm => "Contact Form",
      FormType::Newsletter => "Newsletter",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "Contact Form" => Ok(FormType::ContactForm),
      "Newsletter" => Ok(FormType::Newsletter),
      other => Err(Error::UnknownFormType(other.to_owned())),
    }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Triage status of a submission. Transitions are unconstrained.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
  #[default]
  New,
  Read,
  Responded,
}

impl SubmissionStatus {
  pub const ALL: [SubmissionStatus; 3] =
    [SubmissionStatus::New, SubmissionStatus::Read, SubmissionStatus::Responded];

  pub fn as_str(self) -> &'static str {
    match self {
      SubmissionStatus::New => "new",
      SubmissionStatus::Read => "read",
      SubmissionStatus::Responded => "responded",
    }
  }

  /// Capitalised form used for labels and badges.
  pub fn label(self) -> &'static str {
    match self {
      SubmissionStatus::New => "New",
      SubmissionStatus::Read => "Read",
      SubmissionStatus::Responded => "Responded",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "new" => Ok(SubmissionStatus::New),
      "read" => Ok(SubmissionStatus::Read),
      "responded" => Ok(SubmissionStatus::Responded),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A validated submission ready to be inserted. `submitted_at`, `status`
/// and `id` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
  pub name:       String,
  pub email:      String,
  pub mobile:     Option<String>,
  pub company:    Option<String>,
  pub message:    Option<String>,
  pub form_type:  FormType,
  pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
  pub id:           i64,
  pub name:         String,
  pub email:        String,
  pub mobile:       Option<String>,
  pub company:      Option<String>,
  pub message:      Option<String>,
  pub form_type:    FormType,
  pub submitted_at: DateTime<Utc>,
  pub ip_address:   Option<String>,
  pub status:       SubmissionStatus,
  /// Reserved; no current flow writes it.
  pub notes:        Option<String>,
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Counts shown at the top of the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SubmissionStats {
  pub total: u64,
  pub new:   u64,
  pub today: u64,
}

/// A half-open `[start, end)` UTC interval covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl DayWindow {
  /// The local calendar day (in `at`'s own time zone) that contains `at`.
  pub fn containing<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
    let tz = at.timezone();
    let day = at.date_naive();
    let next = day.succ_opt().unwrap_or(day);
    Self {
      start: local_midnight(&tz, day),
      end:   local_midnight(&tz, next),
    }
  }

  pub fn contains(&self, t: DateTime<Utc>) -> bool {
    self.start <= t && t < self.end
  }
}

/// First valid instant of `day` in `tz`. Midnight can fall into a DST gap in
/// a few zones; in that case the clock resumes within the next hour.
fn local_midnight<Tz: TimeZone>(tz: &Tz, day: chrono::NaiveDate) -> DateTime<Utc> {
  let midnight = day.and_time(NaiveTime::MIN);
  tz.from_local_datetime(&midnight)
    .earliest()
    .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|| midnight.and_utc())
}

// ─── Display helpers ─────────────────────────────────────────────────────────

/// Shorten a message for list display: more than [`LIST_MESSAGE_LIMIT`]
/// characters become the first fifty followed by `...`.
pub fn truncate_for_list(message: &str) -> String {
  match message.char_indices().nth(LIST_MESSAGE_LIMIT) {
    Some((cut, _)) => format!("{}...", &message[..cut]),
    None => message.to_owned(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::FixedOffset;

  use super::*;

  #[test]
  fn status_parse_round_trips() {
    for status in SubmissionStatus::ALL {
      assert_eq!(SubmissionStatus::parse(status.as_str()).unwrap(), status);
    }
    assert!(matches!(
      SubmissionStatus::parse("archived"),
      Err(Error::UnknownStatus(_))
    ));
  }

  #[test]
  fn form_type_uses_display_names() {
    assert_eq!(FormType::ContactForm.as_str(), "Contact Form");
    assert_eq!(FormType::parse("Newsletter").unwrap(), FormType::Newsletter);
    assert!(FormType::parse("Test Form").is_err());
  }

  #[test]
  fn sixty_char_message_is_truncated() {
    let message = "a".repeat(60);
    let shown = truncate_for_list(&message);
    assert_eq!(shown, format!("{}...", "a".repeat(50)));
  }

  #[test]
  fn fifty_char_message_is_unchanged() {
    let message = "b".repeat(50);
    assert_eq!(truncate_for_list(&message), message);
    assert_eq!(truncate_for_list("Hello"), "Hello");
  }

  #[test]
  fn truncation_counts_characters_not_bytes() {
    let message = "é".repeat(51);
    let shown = truncate_for_list(&message);
    assert_eq!(shown.chars().count(), 53);
    assert!(shown.ends_with("é..."));
  }

  #[test]
  fn day_window_follows_the_local_offset() {
    let tz = FixedOffset::east_opt(5 * 3600).unwrap();
    let at = tz.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();
    let window = DayWindow::containing(&at);

    assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 9, 19, 0, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 10, 19, 0, 0).unwrap());
    assert!(window.contains(at.with_timezone(&Utc)));
    assert!(!window.contains(window.end));
  }
}
