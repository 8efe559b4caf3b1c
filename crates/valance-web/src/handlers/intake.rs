//! `POST /contact`: validate a form post and record it.
//!
//! Always answers with an [`IntakeResponse`] JSON object. Storage failures
//! are logged here and reported to the caller only as a generic retry
//! message.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  Form, Json,
  extract::{ConnectInfo, FromRequestParts, State, rejection::FormRejection},
  http::{StatusCode, request::Parts},
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use valance_core::{
  intake::{ContactForm, ValidationErrors},
  store::{Database, StoreError, SubmissionStore},
  submission::{NewSubmission, Submission},
};

use crate::{AppState, handlers::close_store};

pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been received successfully.";
pub const VALIDATION_MESSAGE: &str = "Please correct the following errors:";
pub const RETRY_MESSAGE: &str =
  "Sorry, there was an error saving your message. Please try again.";
pub const METHOD_MESSAGE: &str = "Invalid request method.";
pub const MALFORMED_MESSAGE: &str = "Invalid form submission.";

/// JSON body of every intake response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeResponse {
  pub success: bool,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub errors:  Option<Vec<String>>,
}

impl IntakeResponse {
  fn accepted() -> Self {
    Self { success: true, message: SUCCESS_MESSAGE.to_owned(), errors: None }
  }

  fn failure(message: &str) -> Self {
    Self { success: false, message: message.to_owned(), errors: None }
  }

  fn invalid(errors: Vec<String>) -> Self {
    Self {
      success: false,
      message: VALIDATION_MESSAGE.to_owned(),
      errors:  Some(errors),
    }
  }

  fn with_status(self, status: StatusCode) -> Response { (status, Json(self)).into_response() }
}

/// The caller's IP address, when the server was started with connect info.
pub struct ClientIp(pub Option<String>);

impl<S> FromRequestParts<S> for ClientIp
where
  S: Send + Sync,
{
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let ip = parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| addr.ip().to_string());
    Ok(ClientIp(ip))
  }
}

/// `POST /contact`
pub async fn submit<D>(
  State(state): State<AppState<D>>,
  ClientIp(ip): ClientIp,
  form: Result<Form<ContactForm>, FormRejection>,
) -> Response
where
  D: Database + 'static,
{
  let Form(form) = match form {
    Ok(form) => form,
    Err(rejection) => {
      tracing::debug!(%rejection, "unreadable intake body");
      return IntakeResponse::failure(MALFORMED_MESSAGE).with_status(StatusCode::BAD_REQUEST);
    }
  };

  let input = match form.into_submission(ip) {
    Ok(input) => input,
    Err(ValidationErrors(errors)) => {
      tracing::debug!(?errors, "intake validation failed");
      return IntakeResponse::invalid(errors).with_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
  };

  match record(&*state.db, input).await {
    Ok(submission) => {
      tracing::info!(
        id = submission.id,
        form_type = submission.form_type.as_str(),
        "submission recorded"
      );
      IntakeResponse::accepted().with_status(StatusCode::OK)
    }
    Err(e) => {
      tracing::error!(error = %e, "failed to store submission");
      IntakeResponse::failure(RETRY_MESSAGE).with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }
  }
}

/// Any other method on `/contact`.
pub async fn method_not_allowed() -> Response {
  IntakeResponse::failure(METHOD_MESSAGE).with_status(StatusCode::METHOD_NOT_ALLOWED)
}

async fn record<D: Database>(db: &D, input: NewSubmission) -> Result<Submission, StoreError<D>> {
  let store = db.connect().await?;
  let result = store.insert_submission(input).await;
  close_store(store).await;
  result
}
