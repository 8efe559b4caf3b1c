pub mod admin;
pub mod assets;
pub mod intake;

use valance_core::store::SubmissionStore;

/// Close a request-scoped store. A failed close happens after the work is
/// done, so it is logged rather than surfaced.
pub(super) async fn close_store<S: SubmissionStore>(store: S) {
  if let Err(e) = store.close().await {
    tracing::warn!(error = %e, "failed to close database connection");
  }
}
