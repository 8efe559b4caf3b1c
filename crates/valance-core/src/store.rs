//! Store traits.
//!
//! Implemented by storage backends (e.g. `valance-store-sqlite`). The web
//! layer depends on these abstractions, not on any concrete backend.
//!
//! A [`Database`] hands out one fresh store handle per request. Handles are
//! never pooled: the caller opens one, does its work and calls
//! [`SubmissionStore::close`] before responding.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  session::AdminSession,
  submission::{DayWindow, NewSubmission, Submission, SubmissionStats, SubmissionStatus},
};

// ─── Connection factory ──────────────────────────────────────────────────────

/// The error type of the stores a [`Database`] hands out.
pub type StoreError<D> = <<D as Database>::Store as SubmissionStore>::Error;

pub trait Database: Send + Sync {
  type Store: SessionStore;

  /// Open a new, unshared store handle.
  fn connect(
    &self,
  ) -> impl Future<Output = Result<Self::Store, <Self::Store as SubmissionStore>::Error>>
  + Send
  + '_;
}

// ─── Submissions ─────────────────────────────────────────────────────────────

/// Every method touches exactly one row or runs one read-only query; no
/// transaction spans more than one row.
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Submissions ───────────────────────────────────────────────────────

  /// Insert a submission with `status = new` and `submitted_at = now`.
  fn insert_submission(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<Submission, Self::Error>> + Send + '_;

  fn get_submission(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Submission>, Self::Error>> + Send + '_;

  /// All submissions, most recent first. Unbounded.
  fn list_submissions(
    &self,
  ) -> impl Future<Output = Result<Vec<Submission>, Self::Error>> + Send + '_;

  /// Overwrite a submission's status. Returns the number of rows affected;
  /// an unknown id affects zero rows and is not an error.
  fn set_status(
    &self,
    id: i64,
    status: SubmissionStatus,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Total, `new`, and submitted-within-`today` counts.
  fn stats(
    &self,
    today: DayWindow,
  ) -> impl Future<Output = Result<SubmissionStats, Self::Error>> + Send + '_;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Release the underlying connection.
  fn close(self) -> impl Future<Output = Result<(), Self::Error>> + Send
  where
    Self: Sized;
}

// ─── Admin sessions ──────────────────────────────────────────────────────────

pub trait SessionStore: SubmissionStore {
  fn create_session<'a>(
    &'a self,
    session: &'a AdminSession,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// `true` if a session with this token hash exists and has not expired.
  fn session_is_active<'a>(
    &'a self,
    token_hash: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every session that expired at or before `now`.
  fn purge_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
