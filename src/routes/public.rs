use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The login and unauthorized views live
/// here because the guard redirects to them.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /login?redirect=/payroll
        // Describes the login view and echoes the return path the guard preserved.
        // POST /login
        // Verifies demo credentials and issues a session token.
        .route("/login", get(handlers::login_view).post(handlers::login))
        // POST /logout
        // Tokens are stateless; the client drops its copy.
        .route("/logout", post(handlers::logout))
        // GET /unauthorized
        // Where the guard sends authenticated users whose role is not admitted.
        .route("/unauthorized", get(handlers::unauthorized_view))
}
