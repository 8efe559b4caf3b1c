//! [`SqliteDatabase`]: hands out one fresh [`SqliteStore`] per request, plus
//! the operator-facing setup and check tooling.

use std::path::{Path, PathBuf};

use chrono::Utc;
use valance_core::{
  store::{Database, SubmissionStore},
  submission::{FormType, SubmissionStatus},
};

use crate::{
  Result,
  encode::encode_dt,
  schema::TABLES,
  store::SqliteStore,
};

/// Sample rows written by `seed_sample_data`: name, email, mobile, company,
/// message.
const SAMPLE_SUBMISSIONS: [(&str, &str, &str, &str, &str); 2] = [
  (
    "John Doe",
    "john@example.com",
    "+1234567890",
    "ABC Company",
    "This is a test message from the contact form.",
  ),
  (
    "Jane Smith",
    "jane@example.com",
    "+1987654321",
    "XYZ Corp",
    "Interested in your web development services.",
  ),
];

/// A database file. Cloning copies the path only; no connection is held.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
  path: PathBuf,
}

impl SqliteDatabase {
  /// Refer to a database file without touching it or applying the schema.
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self { path: path.as_ref().to_path_buf() }
  }

  /// Create the file if needed and apply the schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let db = Self::new(path);
    let store = SqliteStore::open(&db.path).await?;
    store.init_schema().await?;
    store.close().await?;
    tracing::debug!(path = %db.path.display(), "schema initialised");
    Ok(db)
  }

  pub fn path(&self) -> &Path { &self.path }

  /// Insert the two sample contact submissions if the table is empty.
  /// Returns the number of rows inserted.
  pub async fn seed_sample_data(&self) -> Result<usize> {
    let store = SqliteStore::open(&self.path).await?;
    let at_str = encode_dt(Utc::now());

    let inserted = store
      .connection()
      .call(move |conn| {
        let existing: i64 =
          conn.query_row("SELECT COUNT(*) FROM contact_submissions", [], |row| row.get(0))?;
        if existing > 0 {
          return Ok(0);
        }
        let mut stmt = conn.prepare(
          "INSERT INTO contact_submissions (
             name, email, mobile, company, message, form_type, submitted_at, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for (name, email, mobile, company, message) in SAMPLE_SUBMISSIONS {
          stmt.execute(rusqlite::params![
            name,
            email,
            mobile,
            company,
            message,
            FormType::ContactForm.as_str(),
            at_str,
            SubmissionStatus::New.as_str(),
          ])?;
        }
        Ok(SAMPLE_SUBMISSIONS.len())
      })
      .await?;

    store.close().await?;
    Ok(inserted)
  }

  /// Report which tables exist and whether a test insert succeeds. The test
  /// row is written inside a transaction that is always rolled back. A file
  /// that does not exist is an error; it is never created.
  pub async fn check(&self) -> Result<CheckReport> {
    let store = SqliteStore::open_existing(&self.path).await?;
    let at_str = encode_dt(Utc::now());

    let report = store
      .connection()
      .call(move |conn| {
        let mut present_tables = Vec::new();
        let mut missing_tables = Vec::new();
        for table in TABLES {
          let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            rusqlite::params![table],
            |row| row.get(0),
          )?;
          if exists > 0 {
            present_tables.push(table.to_owned());
          } else {
            missing_tables.push(table.to_owned());
          }
        }

        let tx = conn.transaction()?;
        let test_insert_error = tx
          .execute(
            "INSERT INTO contact_submissions (name, email, message, form_type, submitted_at)
             VALUES ('Test User', 'test@example.com', 'This is a test message', ?1, ?2)",
            rusqlite::params![FormType::ContactForm.as_str(), at_str],
          )
          .err()
          .map(|e| e.to_string());
        tx.rollback()?;

        Ok(CheckReport { present_tables, missing_tables, test_insert_error })
      })
      .await?;

    store.close().await?;
    Ok(report)
  }
}

impl Database for SqliteDatabase {
  type Store = SqliteStore;

  async fn connect(&self) -> Result<SqliteStore> { SqliteStore::open(&self.path).await }
}

/// Outcome of [`SqliteDatabase::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
  pub present_tables:    Vec<String>,
  pub missing_tables:    Vec<String>,
  /// Raw database error from the test insert, if it failed.
  pub test_insert_error: Option<String>,
}

impl CheckReport {
  pub fn is_healthy(&self) -> bool {
    self.missing_tables.is_empty() && self.test_insert_error.is_none()
  }
}
