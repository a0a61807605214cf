use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod layout;
pub mod models;
pub mod repository;

// Routers split by who may reach them (public, any role, management, admin).
pub mod routes;
use routes::{ADMIN_ONLY, MANAGEMENT, admin, authenticated, management, public};

// --- Public Re-exports ---

pub use auth::{AuthProviderState, AuthState, JwtAuthProvider, StaticAuthProvider};
pub use config::AppConfig;
pub use guard::{GuardOutcome, RouteGuardConfig, evaluate};
pub use repository::{MockRepository, RepositoryState};

use guard::{GuardState, protected_route};

/// ApiDoc
///
/// The OpenAPI document for every route, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login_view, handlers::login, handlers::logout, handlers::unauthorized_view,
        handlers::get_me, handlers::get_dashboard, handlers::get_tasks, handlers::complete_task,
        handlers::get_my_leave, handlers::apply_for_leave, handlers::get_employees,
        handlers::get_employee, handlers::get_leave_requests, handlers::approve_leave_request,
        handlers::reject_leave_request, handlers::get_payroll, handlers::mark_payroll_paid,
        handlers::get_job_applications, handlers::shortlist_application,
        handlers::reject_application, handlers::get_user_accounts
    ),
    components(
        schemas(
            models::Role, models::User, models::UserProfile, models::Employee,
            models::LeaveRequest, models::PayrollRecord, models::JobApplication, models::Task,
            models::LoginRequest, models::LoginResponse, models::LoginView,
            models::UnauthorizedView, models::LoadingView, models::DashboardStats,
            models::Toast, models::NavItem, models::LayoutShell,
            models::LeaveApplicationRequest,
        )
    ),
    tags(
        (name = "staffdesk", description = "Employee management dashboard API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of shared services. Cloned per request; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Mock HR data behind every table.
    pub repo: RepositoryState,
    /// Resolves who the caller is for the route guard.
    pub auth: AuthProviderState,
    pub config: AppConfig,
}

impl AppState {
    /// Production wiring: the seeded data set and JWT sessions.
    pub fn new(config: AppConfig) -> Self {
        let repo: RepositoryState = std::sync::Arc::new(MockRepository::seeded());
        let auth: AuthProviderState =
            std::sync::Arc::new(JwtAuthProvider::new(repo.clone(), &config));
        Self { repo, auth, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthProviderState {
    fn from_ref(app_state: &AppState) -> AuthProviderState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routers, mounts one route guard per protected router with that
/// router's role set, and applies the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let guarded = |router: Router<AppState>, config: RouteGuardConfig| {
        router.route_layer(middleware::from_fn_with_state(
            GuardState::new(&state, config),
            protected_route,
        ))
    };

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(guarded(
            authenticated::authenticated_routes(),
            RouteGuardConfig::any_role(),
        ))
        .merge(guarded(
            management::management_routes(),
            RouteGuardConfig::roles(MANAGEMENT.iter().copied()),
        ))
        .nest(
            "/admin",
            guarded(
                admin::admin_routes(),
                RouteGuardConfig::roles(ADMIN_ONLY.iter().copied()),
            ),
        )
        .with_state(state.clone());

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the request id, so every log line of one request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
