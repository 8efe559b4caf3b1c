//! SQL schema for the Valance SQLite store.
//!
//! Executed once when the database is opened. Future migrations will be
//! gated on `PRAGMA user_version`.

/// Tables the store expects; used by the operator check.
pub const TABLES: [&str; 3] =
  ["contact_submissions", "newsletter_subscriptions", "admin_sessions"];

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Rows are inserted once; afterwards only status and notes change.
CREATE TABLE IF NOT EXISTS contact_submissions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    mobile        TEXT,
    company       TEXT,
    message       TEXT,
    form_type     TEXT NOT NULL DEFAULT 'Contact Form'
                  CHECK (form_type IN ('Contact Form', 'Newsletter')),
    submitted_at  TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    ip_address    TEXT,
    status        TEXT NOT NULL DEFAULT 'new'
                  CHECK (status IN ('new', 'read', 'responded')),
    notes         TEXT
);

CREATE INDEX IF NOT EXISTS submissions_email_idx     ON contact_submissions(email);
CREATE INDEX IF NOT EXISTS submissions_submitted_idx ON contact_submissions(submitted_at);
CREATE INDEX IF NOT EXISTS submissions_status_idx    ON contact_submissions(status);

CREATE TABLE IF NOT EXISTS newsletter_subscriptions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT NOT NULL,
    email          TEXT NOT NULL UNIQUE,
    subscribed_at  TEXT NOT NULL,
    status         TEXT NOT NULL DEFAULT 'active'
                   CHECK (status IN ('active', 'unsubscribed')),
    ip_address     TEXT
);

CREATE INDEX IF NOT EXISTS subscriptions_status_idx ON newsletter_subscriptions(status);

-- Only the SHA-256 of the cookie token is stored.
CREATE TABLE IF NOT EXISTS admin_sessions (
    token_hash  TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS sessions_expires_idx ON admin_sessions(expires_at);

PRAGMA user_version = 1;
";
