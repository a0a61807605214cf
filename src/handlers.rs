use crate::{
    AppState,
    auth::{AuthUser, issue_token, verify_password},
    guard::{LOGIN_PATH, UNAUTHORIZED_PATH},
    models::{
        DashboardStats, DemoAccount, Employee, JobApplication, LeaveApplicationRequest,
        LeaveRequest, LeaveStatus, LoginRequest, LoginResponse, LoginView, PayrollRecord,
        PayrollStatus, Task, TaskStatus, Toast, UnauthorizedView, User, UserProfile,
    },
    repository::RepositoryState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri, header},
};
use serde::Deserialize;
use uuid::Uuid;

/// Where a freshly logged-in user lands when no return path was preserved.
pub const DEFAULT_LANDING: &str = "/dashboard";

// --- Query Structs ---

/// LoginQuery
///
/// Query parameters of GET /login, as written by the route guard's redirect.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LoginQuery {
    /// Percent-decoded path the user originally asked for.
    pub redirect: Option<String>,
}

/// sanitize_return_path
///
/// Accepts only local absolute paths so the login flow cannot be turned into an
/// open redirect. The login and unauthorized views themselves are not valid targets.
pub fn sanitize_return_path(raw: Option<&str>) -> Option<String> {
    let path = raw?.trim();
    // Browsers drop tabs and newlines before resolving, so "/\t/host" would become "//host".
    let local = path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control);
    let is_auth_view = [LOGIN_PATH, UNAUTHORIZED_PATH].iter().any(|view| {
        path == *view
            || path.starts_with(&format!("{view}?"))
            || path.starts_with(&format!("{view}/"))
    });

    (local && !is_auth_view).then(|| path.to_string())
}

// --- Public Handlers ---

/// login_view
///
/// [Public Route] Describes the login screen. The return path is sanitized here as
/// well, so the client never echoes a foreign URL back.
#[utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses((status = 200, description = "Login view", body = LoginView))
)]
pub async fn login_view(
    State(repo): State<RepositoryState>,
    Query(query): Query<LoginQuery>,
) -> Json<LoginView> {
    let demo_accounts = repo
        .list_users()
        .await
        .into_iter()
        .map(|u| DemoAccount {
            email: u.email,
            role: u.role,
        })
        .collect();

    Json(LoginView {
        return_to: sanitize_return_path(query.redirect.as_deref()),
        demo_accounts,
    })
}

/// login
///
/// [Public Route] Verifies credentials against the directory and issues a session
/// token. Unknown email and wrong password are indistinguishable (401).
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let hash = state
        .repo
        .get_password_hash(user.id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // argon2 is CPU-bound; keep it off the async workers.
    let password = payload.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("password verification task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if !verified {
        tracing::info!(email = %payload.email, "login rejected");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let config = &state.config;
    let token = issue_token(&user, &config.jwt_secret, config.token_ttl).map_err(|e| {
        tracing::error!("failed to sign session token: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(&user),
        redirect_to: sanitize_return_path(payload.redirect.as_deref())
            .unwrap_or_else(|| DEFAULT_LANDING.to_string()),
    }))
}

/// logout
///
/// [Public Route] Sessions are bearer tokens held by the client, so there is
/// nothing to revoke server-side.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 200, description = "Logged out", body = Toast))
)]
pub async fn logout() -> Json<Toast> {
    Json(Toast::info("You have been signed out."))
}

/// unauthorized_view
///
/// [Public Route] Explains the rejection and offers a way back: the referring page
/// when it is local, else the dashboard.
#[utoipa::path(
    get,
    path = "/unauthorized",
    responses((status = 200, description = "Unauthorized view", body = UnauthorizedView))
)]
pub async fn unauthorized_view(headers: HeaderMap) -> Json<UnauthorizedView> {
    let back_to = referer_path(&headers).unwrap_or_else(|| DEFAULT_LANDING.to_string());

    Json(UnauthorizedView {
        message: "You do not have permission to view this page.".to_string(),
        back_to,
    })
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] The caller's profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}

/// get_dashboard
///
/// [Authenticated Route] Headline counters. Management sees organisation totals,
/// employees see their own open tasks and pending leave.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses((status = 200, description = "Dashboard counters", body = DashboardStats))
)]
pub async fn get_dashboard(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
) -> Json<DashboardStats> {
    if user.role.is_management() {
        let employees = repo.get_employees().await;
        let leave = repo.get_leave_requests().await;
        let payroll = repo.get_payroll().await;
        let applications = repo.get_job_applications().await;

        return Json(DashboardStats {
            total_employees: Some(employees.len() as i64),
            pending_leave_requests: Some(count(&leave, |l| l.status == LeaveStatus::Pending)),
            pending_payroll: Some(count(&payroll, |p| p.status == PayrollStatus::Pending)),
            open_applications: Some(count(&applications, |a| a.status.is_open())),
            ..DashboardStats::default()
        });
    }

    let tasks = repo.get_tasks().await;
    let my_leave = own_leave(&repo, &user).await;

    Json(DashboardStats {
        my_open_tasks: Some(count(&tasks, |t| {
            t.assignee_id == user.id && t.status != TaskStatus::Done
        })),
        my_pending_leave: Some(count(&my_leave, |l| l.status == LeaveStatus::Pending)),
        ..DashboardStats::default()
    })
}

/// get_tasks
///
/// [Authenticated Route] The task board. Employees only see their assignments.
#[utoipa::path(
    get,
    path = "/tasks",
    responses((status = 200, description = "Tasks", body = [Task]))
)]
pub async fn get_tasks(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
) -> Json<Vec<Task>> {
    let tasks = repo.get_tasks().await;
    if user.role.is_management() {
        return Json(tasks);
    }
    Json(tasks.into_iter().filter(|t| t.assignee_id == user.id).collect())
}

/// complete_task
///
/// [Authenticated Route] "Mark complete" button. Employees may only act on their own
/// tasks; someone else's task is reported as 404, like a missing one.
#[utoipa::path(
    post,
    path = "/tasks/{id}/complete",
    params(("id" = Uuid, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Toast", body = Toast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn complete_task(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Toast>, StatusCode> {
    let task = repo
        .get_task(id)
        .await
        .filter(|t| user.role.is_management() || t.assignee_id == user.id)
        .ok_or(StatusCode::NOT_FOUND)?;

    tracing::info!(actor = %user.id, task = %task.id, "task marked complete");
    Ok(Json(Toast::success(format!(
        "Task \"{}\" marked as complete.",
        task.title
    ))))
}

/// get_my_leave
///
/// [Authenticated Route] The caller's own leave history, matched through the
/// employee record that shares their email.
#[utoipa::path(
    get,
    path = "/my-leave",
    responses((status = 200, description = "Own leave requests", body = [LeaveRequest]))
)]
pub async fn get_my_leave(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
) -> Json<Vec<LeaveRequest>> {
    Json(own_leave(&repo, &user).await)
}

/// apply_for_leave
///
/// [Authenticated Route] Leave application form. The request is acknowledged with a
/// toast and discarded.
#[utoipa::path(
    post,
    path = "/my-leave",
    request_body = LeaveApplicationRequest,
    responses((status = 200, description = "Toast", body = Toast))
)]
pub async fn apply_for_leave(
    AuthUser(user): AuthUser,
    Json(payload): Json<LeaveApplicationRequest>,
) -> Json<Toast> {
    tracing::info!(actor = %user.id, kind = ?payload.kind, "leave application submitted");
    Json(Toast::success(format!(
        "Leave request for {} to {} submitted.",
        payload.start_date, payload.end_date
    )))
}

// --- Management Handlers ---

#[utoipa::path(
    get,
    path = "/employees",
    responses((status = 200, description = "Employee directory", body = [Employee]))
)]
pub async fn get_employees(State(repo): State<RepositoryState>) -> Json<Vec<Employee>> {
    Json(repo.get_employees().await)
}

#[utoipa::path(
    get,
    path = "/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee", body = Employee),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_employee(
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, StatusCode> {
    repo.get_employee(id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[utoipa::path(
    get,
    path = "/leave-requests",
    responses((status = 200, description = "Leave requests", body = [LeaveRequest]))
)]
pub async fn get_leave_requests(State(repo): State<RepositoryState>) -> Json<Vec<LeaveRequest>> {
    Json(repo.get_leave_requests().await)
}

/// approve_leave_request
///
/// [Management Route] "Approve" button on the leave table.
#[utoipa::path(
    post,
    path = "/leave-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Toast", body = Toast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn approve_leave_request(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Toast>, StatusCode> {
    let request = repo.get_leave_request(id).await.ok_or(StatusCode::NOT_FOUND)?;
    tracing::info!(actor = %user.id, leave = %request.id, "leave request approved");
    Ok(Json(Toast::success(format!(
        "Leave request for {} approved.",
        request.employee_name
    ))))
}

/// reject_leave_request
///
/// [Management Route] "Reject" button on the leave table.
#[utoipa::path(
    post,
    path = "/leave-requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Toast", body = Toast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn reject_leave_request(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Toast>, StatusCode> {
    let request = repo.get_leave_request(id).await.ok_or(StatusCode::NOT_FOUND)?;
    tracing::info!(actor = %user.id, leave = %request.id, "leave request rejected");
    Ok(Json(Toast::info(format!(
        "Leave request for {} rejected.",
        request.employee_name
    ))))
}

#[utoipa::path(
    get,
    path = "/payroll",
    responses((status = 200, description = "Payroll", body = [PayrollRecord]))
)]
pub async fn get_payroll(State(repo): State<RepositoryState>) -> Json<Vec<PayrollRecord>> {
    Json(repo.get_payroll().await)
}

/// mark_payroll_paid
///
/// [Management Route] "Mark paid" button on the payroll table.
#[utoipa::path(
    post,
    path = "/payroll/{id}/mark-paid",
    params(("id" = Uuid, Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Toast", body = Toast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn mark_payroll_paid(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Toast>, StatusCode> {
    let record = repo.get_payroll_record(id).await.ok_or(StatusCode::NOT_FOUND)?;
    tracing::info!(actor = %user.id, payroll = %record.id, "payroll marked paid");
    Ok(Json(Toast::success(format!(
        "Salary for {} ({}) marked as paid.",
        record.employee_name, record.period
    ))))
}

#[utoipa::path(
    get,
    path = "/job-applications",
    responses((status = 200, description = "Job applications", body = [JobApplication]))
)]
pub async fn get_job_applications(
    State(repo): State<RepositoryState>,
) -> Json<Vec<JobApplication>> {
    Json(repo.get_job_applications().await)
}

#[utoipa::path(
    post,
    path = "/job-applications/{id}/shortlist",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Toast", body = Toast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn shortlist_application(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Toast>, StatusCode> {
    let application = repo.get_job_application(id).await.ok_or(StatusCode::NOT_FOUND)?;
    tracing::info!(actor = %user.id, application = %application.id, "application shortlisted");
    Ok(Json(Toast::success(format!(
        "{} shortlisted for {}.",
        application.candidate_name, application.position
    ))))
}

#[utoipa::path(
    post,
    path = "/job-applications/{id}/reject",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Toast", body = Toast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn reject_application(
    AuthUser(user): AuthUser,
    State(repo): State<RepositoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Toast>, StatusCode> {
    let application = repo.get_job_application(id).await.ok_or(StatusCode::NOT_FOUND)?;
    tracing::info!(actor = %user.id, application = %application.id, "application rejected");
    Ok(Json(Toast::info(format!(
        "Application from {} rejected.",
        application.candidate_name
    ))))
}

// --- Admin Handlers ---

/// get_user_accounts
///
/// [Admin Route] Every directory account with its role.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "User accounts", body = [User]))
)]
pub async fn get_user_accounts(State(repo): State<RepositoryState>) -> Json<Vec<User>> {
    Json(repo.list_users().await)
}

// --- Helpers ---

/// The `Referer` as a local return path. Absolute referers only count when they
/// point at this host.
fn referer_path(headers: &HeaderMap) -> Option<String> {
    let referer: Uri = headers.get(header::REFERER)?.to_str().ok()?.parse().ok()?;
    if let Some(authority) = referer.authority() {
        let host = headers.get(header::HOST).and_then(|value| value.to_str().ok());
        if host != Some(authority.as_str()) {
            return None;
        }
    }
    sanitize_return_path(referer.path_and_query().map(|pq| pq.as_str()))
}

fn count<T>(rows: &[T], pred: impl Fn(&T) -> bool) -> i64 {
    rows.iter().filter(|row| pred(row)).count() as i64
}

async fn own_leave(repo: &RepositoryState, user: &User) -> Vec<LeaveRequest> {
    let employee_ids: Vec<Uuid> = repo
        .get_employees()
        .await
        .into_iter()
        .filter(|e| e.email.eq_ignore_ascii_case(&user.email))
        .map(|e| e.id)
        .collect();

    repo.get_leave_requests()
        .await
        .into_iter()
        .filter(|l| employee_ids.contains(&l.employee_id))
        .collect()
}
