use crate::models::{
    ApplicationStatus, Employee, EmployeeStatus, JobApplication, LeaveKind, LeaveRequest,
    LeaveStatus, PayrollRecord, PayrollStatus, Role, Task, TaskPriority, TaskStatus, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for every data read the dashboard performs. Handlers only
/// see `Arc<dyn Repository>`, so tests can swap in their own fixtures.
///
/// Reads are infallible: the dashboard renders whatever rows exist, and a missing
/// row is `None`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Directory ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    // PHC-format argon2 hash of the user's password.
    async fn get_password_hash(&self, user_id: Uuid) -> Option<String>;
    async fn list_users(&self) -> Vec<User>;

    // --- HR tables ---
    async fn get_employees(&self) -> Vec<Employee>;
    async fn get_employee(&self, id: Uuid) -> Option<Employee>;
    async fn get_leave_requests(&self) -> Vec<LeaveRequest>;
    async fn get_leave_request(&self, id: Uuid) -> Option<LeaveRequest>;
    async fn get_payroll(&self) -> Vec<PayrollRecord>;
    async fn get_payroll_record(&self, id: Uuid) -> Option<PayrollRecord>;
    async fn get_job_applications(&self) -> Vec<JobApplication>;
    async fn get_job_application(&self, id: Uuid) -> Option<JobApplication>;
    async fn get_tasks(&self) -> Vec<Task>;
    async fn get_task(&self, id: Uuid) -> Option<Task>;
}

/// RepositoryState
///
/// The concrete type used to share the data layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Password shared by every demo account.
pub const DEMO_PASSWORD: &str = "staffdesk-demo";

// argon2 is slow; hash the demo password once per process.
static DEMO_PASSWORD_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    crate::auth::hash_password(DEMO_PASSWORD)
        .inspect_err(|e| tracing::error!("failed to hash demo password: {e}"))
        .ok()
});

// --- Fixed identifiers (stable across restarts so links and tests can use them) ---

pub const ADMIN_ID: Uuid = Uuid::from_u128(0x5d_0001);
pub const HR_ID: Uuid = Uuid::from_u128(0x5d_0002);
pub const EMPLOYEE_ID: Uuid = Uuid::from_u128(0x5d_0003);
pub const SECOND_EMPLOYEE_ID: Uuid = Uuid::from_u128(0x5d_0004);
const DESIGNER_ID: Uuid = Uuid::from_u128(0x5d_0005);
const ANALYST_ID: Uuid = Uuid::from_u128(0x5d_0006);

pub const PENDING_LEAVE_ID: Uuid = Uuid::from_u128(0x1e_0001);
pub const PENDING_PAYROLL_ID: Uuid = Uuid::from_u128(0x9a_0001);
pub const NEW_APPLICATION_ID: Uuid = Uuid::from_u128(0xa9_0001);
pub const EMPLOYEE_TASK_ID: Uuid = Uuid::from_u128(0x7a_0001);

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// MockRepository
///
/// The in-memory data set behind every table on the dashboard. Rows are built once
/// and never change; action handlers read them but nothing writes them.
#[derive(Clone)]
pub struct MockRepository {
    users: Vec<User>,
    employees: Vec<Employee>,
    leave_requests: Vec<LeaveRequest>,
    payroll: Vec<PayrollRecord>,
    applications: Vec<JobApplication>,
    tasks: Vec<Task>,
    // Shared by every account. Resolved at construction so no request pays for argon2.
    password_hash: Option<String>,
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::seeded()
    }
}

impl MockRepository {
    /// An empty data set. Useful for tests of empty-table rendering.
    pub fn empty() -> Self {
        Self {
            users: vec![],
            employees: vec![],
            leave_requests: vec![],
            payroll: vec![],
            applications: vec![],
            tasks: vec![],
            password_hash: DEMO_PASSWORD_HASH.clone(),
        }
    }

    /// The demo organisation: one admin, one HR officer, two employees with
    /// accounts and two more employees without.
    pub fn seeded() -> Self {
        let users = vec![
            user(
                ADMIN_ID,
                "Alice Morgan",
                "admin@staffdesk.test",
                Role::Admin,
            ),
            user(
                HR_ID,
                "Harriet Hughes",
                "hr@staffdesk.test",
                Role::Hr,
            ),
            user(
                EMPLOYEE_ID,
                "Ethan Park",
                "ethan@staffdesk.test",
                Role::Employee,
            ),
            user(
                SECOND_EMPLOYEE_ID,
                "Maya Chen",
                "maya@staffdesk.test",
                Role::Employee,
            ),
        ];

        let employees = vec![
            employee(
                ADMIN_ID,
                "Alice Morgan",
                "admin@staffdesk.test",
                "Operations",
                "Administrator",
                EmployeeStatus::Active,
                date(2019, 3, 4),
            ),
            employee(
                HR_ID,
                "Harriet Hughes",
                "hr@staffdesk.test",
                "People",
                "HR Manager",
                EmployeeStatus::Active,
                date(2020, 6, 15),
            ),
            employee(
                EMPLOYEE_ID,
                "Ethan Park",
                "ethan@staffdesk.test",
                "Engineering",
                "Software Engineer",
                EmployeeStatus::Active,
                date(2022, 1, 10),
            ),
            employee(
                SECOND_EMPLOYEE_ID,
                "Maya Chen",
                "maya@staffdesk.test",
                "Engineering",
                "QA Engineer",
                EmployeeStatus::OnLeave,
                date(2021, 9, 1),
            ),
            employee(
                DESIGNER_ID,
                "Liam Novak",
                "liam@staffdesk.test",
                "Design",
                "Product Designer",
                EmployeeStatus::Active,
                date(2023, 4, 17),
            ),
            employee(
                ANALYST_ID,
                "Sofia Rossi",
                "sofia@staffdesk.test",
                "Finance",
                "Financial Analyst",
                EmployeeStatus::Inactive,
                date(2018, 11, 5),
            ),
        ];

        let leave_requests = vec![
            LeaveRequest {
                id: PENDING_LEAVE_ID,
                employee_id: EMPLOYEE_ID,
                employee_name: "Ethan Park".to_string(),
                kind: LeaveKind::Annual,
                start_date: date(2026, 11, 2),
                end_date: date(2026, 11, 6),
                days: 5,
                reason: "Family trip".to_string(),
                status: LeaveStatus::Pending,
            },
            LeaveRequest {
                id: Uuid::from_u128(0x1e_0002),
                employee_id: SECOND_EMPLOYEE_ID,
                employee_name: "Maya Chen".to_string(),
                kind: LeaveKind::Sick,
                start_date: date(2026, 10, 12),
                end_date: date(2026, 10, 23),
                days: 10,
                reason: "Medical recovery".to_string(),
                status: LeaveStatus::Approved,
            },
            LeaveRequest {
                id: Uuid::from_u128(0x1e_0003),
                employee_id: DESIGNER_ID,
                employee_name: "Liam Novak".to_string(),
                kind: LeaveKind::Personal,
                start_date: date(2026, 12, 1),
                end_date: date(2026, 12, 1),
                days: 1,
                reason: "Moving house".to_string(),
                status: LeaveStatus::Pending,
            },
            LeaveRequest {
                id: Uuid::from_u128(0x1e_0004),
                employee_id: EMPLOYEE_ID,
                employee_name: "Ethan Park".to_string(),
                kind: LeaveKind::Unpaid,
                start_date: date(2026, 8, 3),
                end_date: date(2026, 8, 7),
                days: 5,
                reason: "Extended travel".to_string(),
                status: LeaveStatus::Rejected,
            },
        ];

        let payroll = vec![
            payslip(
                PENDING_PAYROLL_ID,
                EMPLOYEE_ID,
                "Ethan Park",
                620_000,
                40_000,
                95_000,
                PayrollStatus::Pending,
            ),
            payslip(
                Uuid::from_u128(0x9a_0002),
                SECOND_EMPLOYEE_ID,
                "Maya Chen",
                540_000,
                25_000,
                81_000,
                PayrollStatus::Pending,
            ),
            payslip(
                Uuid::from_u128(0x9a_0003),
                HR_ID,
                "Harriet Hughes",
                700_000,
                50_000,
                112_000,
                PayrollStatus::Paid,
            ),
            payslip(
                Uuid::from_u128(0x9a_0004),
                DESIGNER_ID,
                "Liam Novak",
                580_000,
                30_000,
                88_000,
                PayrollStatus::Paid,
            ),
        ];

        let applications = vec![
            JobApplication {
                id: NEW_APPLICATION_ID,
                candidate_name: "Priya Nair".to_string(),
                email: "priya.nair@mail.test".to_string(),
                position: "Backend Engineer".to_string(),
                applied_on: date(2026, 10, 9),
                experience_years: 4,
                status: ApplicationStatus::New,
            },
            JobApplication {
                id: Uuid::from_u128(0xa9_0002),
                candidate_name: "Tom Becker".to_string(),
                email: "tom.becker@mail.test".to_string(),
                position: "Product Designer".to_string(),
                applied_on: date(2026, 9, 28),
                experience_years: 6,
                status: ApplicationStatus::Interview,
            },
            JobApplication {
                id: Uuid::from_u128(0xa9_0003),
                candidate_name: "Lena Fischer".to_string(),
                email: "lena.fischer@mail.test".to_string(),
                position: "HR Coordinator".to_string(),
                applied_on: date(2026, 9, 14),
                experience_years: 2,
                status: ApplicationStatus::Rejected,
            },
        ];

        let tasks = vec![
            Task {
                id: EMPLOYEE_TASK_ID,
                title: "Finish onboarding checklist".to_string(),
                description: "Complete the remaining security and tooling modules.".to_string(),
                assignee_id: EMPLOYEE_ID,
                assignee_name: "Ethan Park".to_string(),
                due_date: date(2026, 10, 24),
                priority: TaskPriority::High,
                status: TaskStatus::InProgress,
            },
            Task {
                id: Uuid::from_u128(0x7a_0002),
                title: "Review API error codes".to_string(),
                description: "Align status codes with the client team.".to_string(),
                assignee_id: EMPLOYEE_ID,
                assignee_name: "Ethan Park".to_string(),
                due_date: date(2026, 11, 3),
                priority: TaskPriority::Medium,
                status: TaskStatus::Todo,
            },
            Task {
                id: Uuid::from_u128(0x7a_0003),
                title: "Regression suite for payroll export".to_string(),
                description: "Cover the October export format.".to_string(),
                assignee_id: SECOND_EMPLOYEE_ID,
                assignee_name: "Maya Chen".to_string(),
                due_date: date(2026, 10, 30),
                priority: TaskPriority::Low,
                status: TaskStatus::Done,
            },
            Task {
                id: Uuid::from_u128(0x7a_0004),
                title: "Quarterly headcount report".to_string(),
                description: "Summarise hires and departures for Q3.".to_string(),
                assignee_id: HR_ID,
                assignee_name: "Harriet Hughes".to_string(),
                due_date: date(2026, 10, 31),
                priority: TaskPriority::High,
                status: TaskStatus::Todo,
            },
        ];

        Self {
            users,
            employees,
            leave_requests,
            payroll,
            applications,
            tasks,
            password_hash: DEMO_PASSWORD_HASH.clone(),
        }
    }

    /// Replaces the directory, keeping the HR tables.
    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }
}

fn user(id: Uuid, name: &str, email: &str, role: Role) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
    }
}

fn employee(
    id: Uuid,
    name: &str,
    email: &str,
    department: &str,
    position: &str,
    status: EmployeeStatus,
    joined_on: NaiveDate,
) -> Employee {
    Employee {
        id,
        name: name.to_string(),
        email: email.to_string(),
        department: department.to_string(),
        position: position.to_string(),
        status,
        joined_on,
    }
}

fn payslip(
    id: Uuid,
    employee_id: Uuid,
    employee_name: &str,
    base_salary: i64,
    allowances: i64,
    deductions: i64,
    status: PayrollStatus,
) -> PayrollRecord {
    PayrollRecord {
        id,
        employee_id,
        employee_name: employee_name.to_string(),
        period: "2026-10".to_string(),
        base_salary,
        allowances,
        deductions,
        net_pay: base_salary + allowances - deductions,
        status,
    }
}

#[async_trait]
impl Repository for MockRepository {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.iter().find(|u| u.id == id).cloned()
    }

    /// Emails compare case-insensitively.
    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned()
    }

    async fn get_password_hash(&self, user_id: Uuid) -> Option<String> {
        if self.users.iter().any(|u| u.id == user_id) {
            self.password_hash.clone()
        } else {
            None
        }
    }

    async fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    async fn get_employees(&self) -> Vec<Employee> {
        self.employees.clone()
    }

    async fn get_employee(&self, id: Uuid) -> Option<Employee> {
        self.employees.iter().find(|e| e.id == id).cloned()
    }

    async fn get_leave_requests(&self) -> Vec<LeaveRequest> {
        self.leave_requests.clone()
    }

    async fn get_leave_request(&self, id: Uuid) -> Option<LeaveRequest> {
        self.leave_requests.iter().find(|l| l.id == id).cloned()
    }

    async fn get_payroll(&self) -> Vec<PayrollRecord> {
        self.payroll.clone()
    }

    async fn get_payroll_record(&self, id: Uuid) -> Option<PayrollRecord> {
        self.payroll.iter().find(|p| p.id == id).cloned()
    }

    async fn get_job_applications(&self) -> Vec<JobApplication> {
        self.applications.clone()
    }

    async fn get_job_application(&self, id: Uuid) -> Option<JobApplication> {
        self.applications.iter().find(|a| a.id == id).cloned()
    }

    async fn get_tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    async fn get_task(&self, id: Uuid) -> Option<Task> {
        self.tasks.iter().find(|t| t.id == id).cloned()
    }
}
