use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Management Router Module
///
/// HR and admin screens. Mounted behind a guard admitting `MANAGEMENT`; handlers
/// in here never check roles themselves.
///
/// Every POST is an action button on one of the tables: it confirms the record
/// exists and answers with a toast. Nothing is written.
pub fn management_routes() -> Router<AppState> {
    Router::new()
        // --- Employees ---
        .route("/employees", get(handlers::get_employees))
        .route("/employees/{id}", get(handlers::get_employee))
        // --- Leave ---
        .route("/leave-requests", get(handlers::get_leave_requests))
        .route(
            "/leave-requests/{id}/approve",
            post(handlers::approve_leave_request),
        )
        .route(
            "/leave-requests/{id}/reject",
            post(handlers::reject_leave_request),
        )
        // --- Payroll ---
        .route("/payroll", get(handlers::get_payroll))
        .route("/payroll/{id}/mark-paid", post(handlers::mark_payroll_paid))
        // --- Recruitment ---
        .route("/job-applications", get(handlers::get_job_applications))
        .route(
            "/job-applications/{id}/shortlist",
            post(handlers::shortlist_application),
        )
        .route(
            "/job-applications/{id}/reject",
            post(handlers::reject_application),
        )
}
