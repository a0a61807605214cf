use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Nested under `/admin` and guarded with `ADMIN_ONLY`.
pub fn admin_routes() -> Router<AppState> {
    // GET /admin/users
    // Lists every account in the directory with its role.
    Router::new().route("/users", get(handlers::get_user_accounts))
}
