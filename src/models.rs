use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity ---

/// Role
///
/// The closed set of access categories. Every protected router is mounted with a
/// subset of these, and the sidebar navigation is filtered by them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Hr,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
        }
    }

    /// Admin and HR share every management screen.
    pub fn is_management(self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User
///
/// A directory entry as resolved by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// UserProfile
///
/// Output schema for GET /me and the header of the layout shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            avatar_url: Some(format!(
                "https://api.dicebear.com/7.x/initials/svg?seed={}",
                urlencoding::encode(&user.name)
            )),
        }
    }
}

// --- HR records ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Inactive,
}

/// Employee
///
/// A row of the employee directory table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub status: EmployeeStatus,
    #[ts(type = "string")]
    pub joined_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LeaveKind {
    Annual,
    Sick,
    Personal,
    Unpaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// LeaveRequest
///
/// A leave application awaiting (or past) review. `days` is precomputed in the
/// mock data; nothing here derives it from the dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub kind: LeaveKind,
    #[ts(type = "string")]
    pub start_date: NaiveDate,
    #[ts(type = "string")]
    pub end_date: NaiveDate,
    pub days: u32,
    pub reason: String,
    pub status: LeaveStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PayrollStatus {
    Pending,
    Paid,
}

/// PayrollRecord
///
/// One payslip line. Amounts are integer cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PayrollRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    /// Pay period as `YYYY-MM`.
    pub period: String,
    #[ts(type = "number")]
    pub base_salary: i64,
    #[ts(type = "number")]
    pub allowances: i64,
    #[ts(type = "number")]
    pub deductions: i64,
    #[ts(type = "number")]
    pub net_pay: i64,
    pub status: PayrollStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ApplicationStatus {
    New,
    Shortlisted,
    Interview,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    /// Still in the hiring pipeline.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            ApplicationStatus::New | ApplicationStatus::Shortlisted | ApplicationStatus::Interview
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct JobApplication {
    pub id: Uuid,
    pub candidate_name: String,
    pub email: String,
    pub position: String,
    #[ts(type = "string")]
    pub applied_on: NaiveDate,
    pub experience_years: u32,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub assignee_id: Uuid,
    pub assignee_name: String,
    #[ts(type = "string")]
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
}

// --- Request Payloads ---

/// LoginRequest
///
/// Input payload for POST /login. `redirect` carries the return path the guard
/// stored when it bounced the user to the login view.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// LeaveApplicationRequest
///
/// Input payload for POST /my-leave. Accepted as-is; nothing is stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LeaveApplicationRequest {
    pub kind: LeaveKind,
    #[ts(type = "string")]
    pub start_date: NaiveDate,
    #[ts(type = "string")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

// --- Views (Output) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
    /// Where the client should navigate after a successful login.
    pub redirect_to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DemoAccount {
    pub email: String,
    pub role: Role,
}

/// LoginView
///
/// Describes the login screen. `return_to` echoes the path the guard preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginView {
    pub return_to: Option<String>,
    pub demo_accounts: Vec<DemoAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UnauthorizedView {
    pub message: String,
    /// Back-navigation target.
    pub back_to: String,
}

/// LoadingView
///
/// Placeholder body returned while the authentication state is unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoadingView {
    pub status: String,
    pub message: String,
}

/// DashboardStats
///
/// Organisation totals are only populated for management roles; the `my_*` counters
/// only for employees. Absent fields are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_employees: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_leave_requests: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_payroll: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_applications: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_open_tasks: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_pending_leave: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Toast
///
/// The transient notification every action handler answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavItem {
    pub label: String,
    pub path: String,
}

/// LayoutShell
///
/// The frame every protected page is rendered inside: header user, role-filtered
/// sidebar and the page's own view model. `user` is only empty when a provider
/// reports an authenticated state without a directory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LayoutShell {
    pub user: Option<UserProfile>,
    pub navigation: Vec<NavItem>,
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
}
