//! `GET`/`POST /admin`: the password-gated console.
//!
//! The same page serves the login form and the dashboard. A POST either
//! carries `password` (login) or `submission_id` + `status` +
//! `update_status` (status change from a logged-in session).

use axum::{
  Form,
  extract::{Query, State, rejection::FormRejection},
  http::{HeaderValue, StatusCode, header},
  response::{Html, IntoResponse, Response},
};
use chrono::{Local, Utc};
use serde::Deserialize;
use valance_core::{
  store::{Database, SessionStore, SubmissionStore},
  submission::{DayWindow, SubmissionStatus},
};

use crate::{
  AppState,
  error::Error,
  handlers::close_store,
  pages::{self, Dashboard},
  session::{
    SessionCookie, SessionState, expired_cookie, issue_session, session_cookie, verify_password,
  },
};

#[derive(Debug, Default, Deserialize)]
pub struct AdminQuery {
  pub logout: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminForm {
  pub password:      Option<String>,
  pub submission_id: Option<String>,
  pub status:        Option<String>,
  pub update_status: Option<String>,
}

/// `GET /admin`
pub async fn show<D>(
  State(state): State<AppState<D>>,
  Query(query): Query<AdminQuery>,
  cookie: SessionCookie,
) -> Result<Response, Error>
where
  D: Database + 'static,
{
  let store = state.db.connect().await.map_err(Error::store)?;
  let result = if query.logout.is_some() {
    logout(&store, &cookie, &state).await
  } else {
    render(&store, &cookie).await
  };
  close_store(store).await;
  result
}

/// `POST /admin`
pub async fn submit<D>(
  State(state): State<AppState<D>>,
  cookie: SessionCookie,
  form: Result<Form<AdminForm>, FormRejection>,
) -> Result<Response, Error>
where
  D: Database + 'static,
{
  let form = form.map(|Form(form)| form).unwrap_or_default();
  let store = state.db.connect().await.map_err(Error::store)?;
  let result = handle_post(&store, cookie, form, &state).await;
  close_store(store).await;
  result
}

async fn handle_post<S, D>(
  store: &S,
  cookie: SessionCookie,
  form: AdminForm,
  state: &AppState<D>,
) -> Result<Response, Error>
where
  S: SessionStore,
  D: Database,
{
  if let Some(password) = form.password.as_deref() {
    if verify_password(password, &state.auth) {
      return login(store, &cookie, state).await;
    }
    tracing::info!("rejected admin login");
  }

  let session = SessionState::resolve(store, &cookie, Utc::now())
    .await
    .map_err(Error::store)?;

  if session.is_logged_in() && form.update_status.is_some() {
    update_status(store, &form).await?;
  }

  page(store, &session).await
}

async fn login<S, D>(
  store: &S,
  cookie: &SessionCookie,
  state: &AppState<D>,
) -> Result<Response, Error>
where
  S: SessionStore,
  D: Database,
{
  let now = Utc::now();
  let purged = store.purge_expired_sessions(now).await.map_err(Error::store)?;
  if purged > 0 {
    tracing::debug!(purged, "purged expired admin sessions");
  }
  if let Some(old) = cookie.token_hash() {
    store.delete_session(&old).await.map_err(Error::store)?;
  }

  let issued = issue_session(&state.auth, now)?;
  store.create_session(&issued.record).await.map_err(Error::store)?;
  tracing::info!("admin logged in");

  let session = SessionState::LoggedIn { token_hash: issued.record.token_hash };
  let mut response = page(store, &session).await?;
  let set_cookie = HeaderValue::from_str(&session_cookie(&issued.token, &state.auth))?;
  response.headers_mut().insert(header::SET_COOKIE, set_cookie);
  Ok(response)
}

async fn logout<S, D>(
  store: &S,
  cookie: &SessionCookie,
  state: &AppState<D>,
) -> Result<Response, Error>
where
  S: SessionStore,
  D: Database,
{
  if let Some(token_hash) = cookie.token_hash() {
    store.delete_session(&token_hash).await.map_err(Error::store)?;
    tracing::info!("admin logged out");
  }
  let set_cookie = HeaderValue::from_str(&expired_cookie(&state.auth))?;
  Ok(
    (
      StatusCode::SEE_OTHER,
      [(header::LOCATION, HeaderValue::from_static("/admin")), (header::SET_COOKIE, set_cookie)],
    )
      .into_response(),
  )
}

/// Apply a status change. Malformed ids or statuses are logged and skipped.
async fn update_status<S: SubmissionStore>(store: &S, form: &AdminForm) -> Result<(), Error> {
  let id = form.submission_id.as_deref().and_then(|id| id.trim().parse::<i64>().ok());
  let status = form.status.as_deref().and_then(|s| SubmissionStatus::parse(s).ok());

  let (Some(id), Some(status)) = (id, status) else {
    tracing::warn!(
      submission_id = form.submission_id.as_deref(),
      status = form.status.as_deref(),
      "ignoring malformed status update"
    );
    return Ok(());
  };

  let updated = store.set_status(id, status).await.map_err(Error::store)?;
  if updated == 0 {
    tracing::warn!(id, "status update for unknown submission");
  } else {
    tracing::info!(id, status = status.as_str(), "submission status updated");
  }
  Ok(())
}

async fn render<S: SessionStore>(store: &S, cookie: &SessionCookie) -> Result<Response, Error> {
  let session = SessionState::resolve(store, cookie, Utc::now())
    .await
    .map_err(Error::store)?;
  page(store, &session).await
}

async fn page<S: SubmissionStore>(store: &S, session: &SessionState) -> Result<Response, Error> {
  let body = if session.is_logged_in() {
    let view = Dashboard {
      stats:       store
        .stats(DayWindow::containing(&Local::now()))
        .await
        .map_err(Error::store)?,
      submissions: store.list_submissions().await.map_err(Error::store)?,
    };
    pages::dashboard_page(&view)?
  } else {
    pages::login_page()?
  };
  Ok(Html(body).into_response())
}
