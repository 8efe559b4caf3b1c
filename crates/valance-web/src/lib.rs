//! HTTP layer for Valance.
//!
//! Exposes an axum [`Router`] with the public contact intake endpoint, the
//! password-gated admin console and the static assets they need. Storage is
//! reached through any [`Database`].

pub mod error;
pub mod handlers;
pub mod html;
pub mod pages;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use valance_core::store::Database;

use handlers::{admin, assets, intake};
use session::AdminAuth;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `VALANCE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Argon2 PHC string; generate one with `--hash-password`.
  #[serde(default)]
  pub admin_password_hash: String,
  #[serde(default = "default_session_ttl_minutes")]
  pub session_ttl_minutes: i64,
  #[serde(default)]
  pub secure_cookie:       bool,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("valance.db") }
fn default_session_ttl_minutes() -> i64 { 120 }

/// Longest accepted admin session: 30 days.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 30;

impl ServerConfig {
  /// `None` unless `session_ttl_minutes` is in `1..=MAX_SESSION_TTL_MINUTES`.
  pub fn session_ttl(&self) -> Option<chrono::Duration> {
    if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.session_ttl_minutes) {
      return None;
    }
    chrono::Duration::try_minutes(self.session_ttl_minutes)
  }

  pub fn admin_auth(&self) -> Result<AdminAuth, Error> {
    let session_ttl = self.session_ttl().ok_or_else(|| {
      Error::Config(format!(
        "session_ttl_minutes must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {}",
        self.session_ttl_minutes
      ))
    })?;
    Ok(AdminAuth {
      password_hash: self.admin_password_hash.clone(),
      session_ttl,
      secure_cookie: self.secure_cookie,
    })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<D: Database> {
  pub db:     Arc<D>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AdminAuth>,
}

impl<D: Database> AppState<D> {
  pub fn new(db: D, config: ServerConfig) -> Result<Self, Error> {
    let auth = config.admin_auth()?;
    Ok(Self { db: Arc::new(db), config: Arc::new(config), auth: Arc::new(auth) })
  }
}

impl<D: Database> Clone for AppState<D> {
  fn clone(&self) -> Self {
    Self {
      db:     Arc::clone(&self.db),
      config: Arc::clone(&self.config),
      auth:   Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the site backend.
pub fn router<D>(state: AppState<D>) -> Router
where
  D: Database + 'static,
{
  Router::new()
    .route("/contact",           post(intake::submit::<D>).fallback(intake::method_not_allowed))
    .route("/admin",             get(admin::show::<D>).post(admin::submit::<D>))
    .route("/assets/contact.js", get(assets::contact_js))
    .route("/assets/admin.css",  get(assets::admin_css))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
