//! Static assets compiled into the binary.

use axum::{http::header, response::IntoResponse};

const CONTACT_JS: &str = include_str!("../../assets/contact.js");
const ADMIN_CSS: &str = include_str!("../../assets/admin.css");

/// `GET /assets/contact.js`: the browser-side form handler.
pub async fn contact_js() -> impl IntoResponse {
  (
    [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
    CONTACT_JS,
  )
}

/// `GET /assets/admin.css`
pub async fn admin_css() -> impl IntoResponse {
  ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], ADMIN_CSS)
}
