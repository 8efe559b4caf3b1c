//! [`SqliteStore`]: the SQLite implementation of [`SubmissionStore`] and
//! [`SessionStore`].

use std::{path::Path, time::Duration};

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OpenFlags, OptionalExtension as _};

use valance_core::{
  session::AdminSession,
  store::{SessionStore, SubmissionStore},
  submission::{
    DayWindow, NewSubmission, Submission, SubmissionStats, SubmissionStatus,
  },
};

use crate::{
  Result,
  encode::{RawSubmission, SUBMISSION_COLUMNS, encode_dt},
  schema::SCHEMA,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

// ─── Store ───────────────────────────────────────────────────────────────────

/// One open connection to the submissions database.
///
/// Handles are request-scoped: open one, use it, then [`close`] it.
///
/// [`close`]: SubmissionStore::close
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open a connection, creating the file if it does not exist. The schema
  /// is not touched; see [`SqliteDatabase::open`](crate::SqliteDatabase::open).
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::with_connection(tokio_rusqlite::Connection::open(path).await?).await
  }

  /// Open a connection to a file that must already exist.
  pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
      | OpenFlags::SQLITE_OPEN_URI
      | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Self::with_connection(tokio_rusqlite::Connection::open_with_flags(path, flags).await?).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store with the schema applied: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = crate::Error;

  // ── Submissions ───────────────────────────────────────────────────────────

  async fn insert_submission(&self, input: NewSubmission) -> Result<Submission> {
    // Stored with microsecond precision; return exactly what a read yields.
    let submitted_at = Utc::now().trunc_subsecs(6);
    let status = SubmissionStatus::New;
    let at_str = encode_dt(submitted_at);

    let (id, input) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contact_submissions (
             name, email, mobile, company, message,
             form_type, submitted_at, ip_address, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            input.name,
            input.email,
            input.mobile,
            input.company,
            input.message,
            input.form_type.as_str(),
            at_str,
            input.ip_address,
            status.as_str(),
          ],
        )?;
        Ok((conn.last_insert_rowid(), input))
      })
      .await?;

    Ok(Submission {
      id,
      name: input.name,
      email: input.email,
      mobile: input.mobile,
      company: input.company,
      message: input.message,
      form_type: input.form_type,
      submitted_at,
      ip_address: input.ip_address,
      status,
      notes: None,
    })
  }

  async fn get_submission(&self, id: i64) -> Result<Option<Submission>> {
    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SUBMISSION_COLUMNS} FROM contact_submissions WHERE id = ?1"),
              rusqlite::params![id],
              RawSubmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn list_submissions(&self) -> Result<Vec<Submission>> {
    let raws: Vec<RawSubmission> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLUMNS} FROM contact_submissions
           ORDER BY submitted_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn set_status(&self, id: i64, status: SubmissionStatus) -> Result<u64> {
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contact_submissions SET status = ?1 WHERE id = ?2",
          rusqlite::params![status.as_str(), id],
        )?)
      })
      .await?;
    Ok(affected as u64)
  }

  async fn stats(&self, today: DayWindow) -> Result<SubmissionStats> {
    let start = encode_dt(today.start);
    let end = encode_dt(today.end);

    let (total, new, today_count): (i64, i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COUNT(*),
             COALESCE(SUM(status = 'new'), 0),
             COALESCE(SUM(submitted_at >= ?1 AND submitted_at < ?2), 0)
           FROM contact_submissions",
          rusqlite::params![start, end],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?)
      })
      .await?;

    Ok(SubmissionStats {
      total: total as u64,
      new:   new as u64,
      today: today_count as u64,
    })
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  async fn create_session(&self, session: &AdminSession) -> Result<()> {
    let token_hash = session.token_hash.clone();
    let created_at = encode_dt(session.created_at);
    let expires_at = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO admin_sessions (token_hash, created_at, expires_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![token_hash, created_at, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn session_is_active(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool> {
    let token_hash = token_hash.to_owned();
    let now_str = encode_dt(now);

    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM admin_sessions WHERE token_hash = ?1 AND expires_at > ?2",
              rusqlite::params![token_hash, now_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn delete_session(&self, token_hash: &str) -> Result<()> {
    let token_hash = token_hash.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM admin_sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
    let now_str = encode_dt(now);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM admin_sessions WHERE expires_at <= ?1",
          rusqlite::params![now_str],
        )?)
      })
      .await?;
    Ok(removed as u64)
  }
}
