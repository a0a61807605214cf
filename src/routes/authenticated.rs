use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Pages every signed-in user has, whatever the role. Handlers narrow the data to
/// the caller where that matters (tasks, own leave, dashboard counters).
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // Organisation totals for management, personal counters for employees.
        .route("/dashboard", get(handlers::get_dashboard))
        // GET /me
        .route("/me", get(handlers::get_me))
        // GET /tasks
        // Everything for management, own assignments for employees.
        .route("/tasks", get(handlers::get_tasks))
        // POST /tasks/{id}/complete
        .route("/tasks/{id}/complete", post(handlers::complete_task))
        // GET/POST /my-leave
        // The caller's own leave history and a leave application form.
        .route(
            "/my-leave",
            get(handlers::get_my_leave).post(handlers::apply_for_leave),
        )
}
