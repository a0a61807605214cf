use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use staffdesk::{
    AppConfig, AppState, AuthState, MockRepository, RepositoryState, StaticAuthProvider,
    create_router,
    models::{LoginResponse, Role, User},
    repository::{ADMIN_ID, DEMO_PASSWORD, EMPLOYEE_ID, HR_ID, PENDING_PAYROLL_ID},
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceExt;
use uuid::Uuid;

// --- Setup ---

/// The production wiring (JWT provider, seeded data) with local defaults, so the
/// `x-user-id` bypass is available.
fn app() -> Router {
    create_router(AppState::new(AppConfig::default()))
}

/// A router whose provider always answers `state`.
fn app_with_state(state: AuthState, config: AppConfig) -> Router {
    let repo: RepositoryState = Arc::new(MockRepository::seeded());
    create_router(AppState {
        repo,
        auth: Arc::new(StaticAuthProvider::new(state)),
        config,
    })
}

fn get(uri: &str, user: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, user: Option<Uuid>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// --- Guard through the router ---

#[tokio::test]
async fn health_check_is_public() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_payroll_visit_redirects_to_login_with_return_path() {
    let response = app().oneshot(get("/payroll", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?redirect=%2Fpayroll");
}

#[tokio::test]
async fn nested_admin_route_keeps_full_return_path() {
    let response = app().oneshot(get("/admin/users", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?redirect=%2Fadmin%2Fusers");
}

#[tokio::test]
async fn employee_on_management_route_redirects_to_unauthorized() {
    let response = app()
        .oneshot(get("/employees", Some(EMPLOYEE_ID)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/unauthorized");
}

#[tokio::test]
async fn hr_is_kept_out_of_admin_routes() {
    let response = app().oneshot(get("/admin/users", Some(HR_ID))).await.unwrap();
    assert_eq!(location(&response), "/unauthorized");
}

#[tokio::test]
async fn admin_page_renders_inside_layout_shell() {
    let response = app()
        .oneshot(get("/employees", Some(ADMIN_ID)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["navigation"].as_array().unwrap().len() > 1);
    assert_eq!(body["content"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn employee_navigation_hides_management_links() {
    let response = app().oneshot(get("/me", Some(EMPLOYEE_ID))).await.unwrap();
    let body = json(response).await;

    let paths: Vec<&str> = body["navigation"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|item| item["path"].as_str())
        .collect();
    assert!(paths.contains(&"/tasks"));
    assert!(!paths.contains(&"/payroll"));
    assert_eq!(body["content"]["email"], "ethan@staffdesk.test");
}

#[tokio::test]
async fn head_reports_the_framed_page_length() {
    let head = Request::builder()
        .method("HEAD")
        .uri("/employees")
        .header("x-user-id", ADMIN_ID.to_string())
        .body(Body::empty())
        .unwrap();
    let head = app().oneshot(head).await.unwrap();
    let page = app()
        .oneshot(get("/employees", Some(ADMIN_ID)))
        .await
        .unwrap();

    assert_eq!(head.status(), StatusCode::OK);
    assert_eq!(
        head.headers().get(header::CONTENT_LENGTH),
        page.headers().get(header::CONTENT_LENGTH)
    );
    let framed = to_bytes(page.into_body(), usize::MAX).await.unwrap();
    assert_eq!(
        head.headers()[header::CONTENT_LENGTH],
        framed.len().to_string().as_str()
    );
}

#[tokio::test]
async fn actions_answer_with_a_bare_toast() {
    let response = app()
        .oneshot(post(
            &format!("/payroll/{PENDING_PAYROLL_ID}/mark-paid"),
            Some(HR_ID),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["kind"], "success");
    assert!(body.get("navigation").is_none());
}

#[tokio::test]
async fn missing_record_is_not_framed() {
    let response = app()
        .oneshot(get(&format!("/employees/{}", Uuid::new_v4()), Some(HR_ID)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_not_redirected() {
    let response = app().oneshot(get("/nowhere", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn loading_state_shows_placeholder() {
    let response = app_with_state(AuthState::loading(), AppConfig::default())
        .oneshot(get("/dashboard", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(json(response).await["status"], "loading");
}

#[tokio::test]
async fn stuck_provider_times_out_into_loading_not_login() {
    let config = AppConfig {
        auth_resolve_timeout: Duration::from_millis(25),
        ..AppConfig::default()
    };
    let repo: RepositoryState = Arc::new(MockRepository::seeded());
    let router = create_router(AppState {
        repo,
        auth: Arc::new(StaticAuthProvider::never_resolves()),
        config,
    });

    let response = router.oneshot(get("/payroll", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn authenticated_state_without_user_renders_unrestricted_pages() {
    let state = AuthState {
        is_loading: false,
        is_authenticated: true,
        user: None,
    };
    let router = app_with_state(state.clone(), AppConfig::default());

    // Handlers that need the caller reject; the guard itself admitted the request.
    let response = router.oneshot(get("/me", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app_with_state(state, AppConfig::default())
        .oneshot(get("/employees", None))
        .await
        .unwrap();
    assert_eq!(location(&response), "/unauthorized");
}

#[tokio::test]
async fn injected_state_decides_without_any_headers() {
    let hr = User {
        id: HR_ID,
        name: "Harriet Hughes".to_string(),
        email: "hr@staffdesk.test".to_string(),
        role: Role::Hr,
    };
    let response = app_with_state(AuthState::authenticated(hr), AppConfig::default())
        .oneshot(get("/leave-requests", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["user"]["role"], "hr");
}

#[tokio::test]
async fn login_view_carries_return_path() {
    let response = app()
        .oneshot(get("/login?redirect=%2Fpayroll", None))
        .await
        .unwrap();
    assert_eq!(json(response).await["return_to"], "/payroll");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let response = app()
        .oneshot(get("/api-docs/openapi.json", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json(response).await;
    assert!(doc["paths"].get("/payroll").is_some());
}

// --- Spawned server ---

async fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn login_then_return_to_protected_page() {
    let address = spawn_app().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    // 1. Bounced to login, with the return path.
    let bounced = client
        .get(format!("{address}/payroll"))
        .send()
        .await
        .unwrap();
    assert_eq!(bounced.status(), 303);
    assert_eq!(
        bounced.headers()["location"].to_str().unwrap(),
        "/login?redirect=%2Fpayroll"
    );

    // 2. Log in carrying the return path.
    let login: LoginResponse = client
        .post(format!("{address}/login"))
        .json(&serde_json::json!({
            "email": "admin@staffdesk.test",
            "password": DEMO_PASSWORD,
            "redirect": "/payroll"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(login.redirect_to, "/payroll");

    // 3. The return path now renders, and the request id is propagated.
    let page = client
        .get(format!("{address}{}", login.redirect_to))
        .bearer_auth(&login.token)
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), 200);
    assert!(page.headers().contains_key("x-request-id"));
    let body: Value = page.json().await.unwrap();
    assert_eq!(body["content"].as_array().unwrap().len(), 4);
}
