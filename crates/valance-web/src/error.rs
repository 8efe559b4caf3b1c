//! Error type for the admin console and its axum `IntoResponse` impl.
//!
//! The intake endpoint never returns this type; it always answers with a
//! structured JSON result instead.

use axum::{
  http::{StatusCode, header::InvalidHeaderValue},
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("render error: {0}")]
  Render(String),
  #[error("invalid configuration: {0}")]
  Config(String),
  #[error("session expiry is out of range")]
  SessionExpiry,
  #[error("invalid header value: {0}")]
  Header(#[from] InvalidHeaderValue),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    tracing::error!(error = %self, "admin request failed");
    // Operator-facing: the raw message is acceptable here.
    (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
  }
}
