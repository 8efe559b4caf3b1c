//! Admin login: password check, session tokens, and the session cookie.
//!
//! A successful login mints a random token, stores its SHA-256 digest in
//! the `admin_sessions` table and hands the token to the browser in an
//! HttpOnly cookie. Each request resolves the cookie back into a
//! [`SessionState`].

use std::convert::Infallible;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use valance_core::{session::AdminSession, store::SessionStore};

use crate::error::Error;

pub const SESSION_COOKIE: &str = "valance_admin";

const TOKEN_BYTES: usize = 32;

/// Credentials and cookie settings for the admin console.
#[derive(Clone)]
pub struct AdminAuth {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub session_ttl:   Duration,
  /// Add the `Secure` attribute to the cookie.
  pub secure_cookie: bool,
}

/// Compare a submitted password against the configured hash.
pub fn verify_password(password: &str, auth: &AdminAuth) -> bool {
  let Ok(parsed) = PasswordHash::new(&auth.password_hash) else {
    tracing::error!("admin_password_hash is not a valid argon2 PHC string");
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// A freshly minted session: the raw token for the cookie and the record to
/// persist.
pub struct IssuedSession {
  pub token:  String,
  pub record: AdminSession,
}

pub fn issue_session(auth: &AdminAuth, now: DateTime<Utc>) -> Result<IssuedSession, Error> {
  let expires_at = now
    .checked_add_signed(auth.session_ttl)
    .ok_or(Error::SessionExpiry)?;

  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  let token = hex::encode(bytes);

  Ok(IssuedSession {
    record: AdminSession { token_hash: hash_token(&token), created_at: now, expires_at },
    token,
  })
}

// ─── Cookie ──────────────────────────────────────────────────────────────────

pub fn session_cookie(token: &str, auth: &AdminAuth) -> String {
  cookie_value(token, auth.session_ttl.num_seconds(), auth.secure_cookie)
}

/// A cookie that makes the browser drop the session immediately.
pub fn expired_cookie(auth: &AdminAuth) -> String {
  cookie_value("", 0, auth.secure_cookie)
}

fn cookie_value(token: &str, max_age: i64, secure: bool) -> String {
  let secure = if secure { "; Secure" } else { "" };
  format!("{SESSION_COOKIE}={token}; Path=/admin; HttpOnly; SameSite=Strict; Max-Age={max_age}{secure}")
}

/// The raw session token from the request's `Cookie` headers, if any.
/// Anything that is not a well-formed token is ignored.
pub struct SessionCookie(pub Option<String>);

impl SessionCookie {
  pub fn from_headers(headers: &HeaderMap) -> Self {
    let token = headers
      .get_all(header::COOKIE)
      .iter()
      .filter_map(|v| v.to_str().ok())
      .flat_map(|v| v.split(';'))
      .filter_map(|pair| pair.trim().split_once('='))
      .find(|(name, _)| *name == SESSION_COOKIE)
      .map(|(_, value)| value.to_owned())
      .filter(|value| {
        value.len() == TOKEN_BYTES * 2 && value.bytes().all(|b| b.is_ascii_hexdigit())
      });
    SessionCookie(token)
  }

  pub fn token_hash(&self) -> Option<String> { self.0.as_deref().map(hash_token) }
}

impl<S> FromRequestParts<S> for SessionCookie
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    Ok(SessionCookie::from_headers(&parts.headers))
  }
}

// ─── Per-request state ───────────────────────────────────────────────────────

/// Whether the current request belongs to a logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
  LoggedOut,
  LoggedIn { token_hash: String },
}

impl SessionState {
  pub fn is_logged_in(&self) -> bool { matches!(self, SessionState::LoggedIn { .. }) }

  /// Look the cookie up in the session table. Unknown or expired tokens are
  /// treated as logged out.
  pub async fn resolve<S: SessionStore>(
    store: &S,
    cookie: &SessionCookie,
    now: DateTime<Utc>,
  ) -> Result<Self, S::Error> {
    let Some(token_hash) = cookie.token_hash() else {
      return Ok(SessionState::LoggedOut);
    };
    if store.session_is_active(&token_hash, now).await? {
      Ok(SessionState::LoggedIn { token_hash })
    } else {
      Ok(SessionState::LoggedOut)
    }
  }
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use valance_store_sqlite::SqliteStore;

  use super::*;

  fn auth(password: &str) -> AdminAuth {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AdminAuth { password_hash: hash, session_ttl: Duration::minutes(30), secure_cookie: false }
  }

  fn headers(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    headers
  }

  #[test]
  fn correct_password() {
    assert!(verify_password("valance2025", &auth("valance2025")));
  }

  #[test]
  fn wrong_password() {
    assert!(!verify_password("guess", &auth("valance2025")));
  }

  #[test]
  fn malformed_hash_rejects_everything() {
    let auth = AdminAuth {
      password_hash: "plaintext".into(),
      session_ttl:   Duration::minutes(30),
      secure_cookie: false,
    };
    assert!(!verify_password("plaintext", &auth));
  }

  #[test]
  fn issued_token_hashes_to_the_stored_digest() {
    let auth = auth("x");
    let now = Utc::now();
    let issued = issue_session(&auth, now).unwrap();
    assert_eq!(issued.token.len(), 64);
    assert_eq!(hash_token(&issued.token), issued.record.token_hash);
    assert_eq!(issued.record.expires_at, now + Duration::minutes(30));
    assert_ne!(issue_session(&auth, now).unwrap().token, issued.token);
  }

  #[test]
  fn expiry_past_the_calendar_is_an_error() {
    let auth = auth("x");
    assert!(matches!(
      issue_session(&auth, DateTime::<Utc>::MAX_UTC),
      Err(Error::SessionExpiry)
    ));
  }

  #[test]
  fn cookie_attributes() {
    let mut auth = auth("x");
    let cookie = session_cookie("abc", &auth);
    assert_eq!(
      cookie,
      "valance_admin=abc; Path=/admin; HttpOnly; SameSite=Strict; Max-Age=1800"
    );
    auth.secure_cookie = true;
    assert!(expired_cookie(&auth).ends_with("Max-Age=0; Secure"));
  }

  #[test]
  fn cookie_is_found_among_others() {
    let token = "ab".repeat(32);
    let cookie = SessionCookie::from_headers(&headers(&format!("theme=dark; valance_admin={token}; x=1")));
    assert_eq!(cookie.0.as_deref(), Some(token.as_str()));
  }

  #[test]
  fn malformed_cookie_is_ignored() {
    assert!(SessionCookie::from_headers(&headers("valance_admin=short")).0.is_none());
    assert!(SessionCookie::from_headers(&headers(&format!("valance_admin={}", "zz".repeat(32)))).0.is_none());
    assert!(SessionCookie::from_headers(&HeaderMap::new()).0.is_none());
  }

  #[tokio::test]
  async fn resolve_follows_the_session_table() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let auth = auth("x");
    let now = Utc::now();

    let issued = issue_session(&auth, now).unwrap();
    let cookie = SessionCookie(Some(issued.token.clone()));
    assert_eq!(SessionState::resolve(&store, &cookie, now).await.unwrap(), SessionState::LoggedOut);

    store.create_session(&issued.record).await.unwrap();
    assert!(SessionState::resolve(&store, &cookie, now).await.unwrap().is_logged_in());

    let later = now + Duration::minutes(31);
    assert_eq!(SessionState::resolve(&store, &cookie, later).await.unwrap(), SessionState::LoggedOut);
  }
}
