//! Persisted admin login sessions.
//!
//! The browser holds a random token; the store only ever sees its SHA-256
//! digest.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
  /// Lowercase hex SHA-256 of the cookie token.
  pub token_hash: String,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl AdminSession {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at }
}
