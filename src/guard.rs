//! Route protection.
//!
//! `evaluate` is the decision: a pure function of the caller's [`AuthState`], the
//! route's [`RouteGuardConfig`] and the requested location. `protected_route` is the
//! axum middleware that feeds it and turns the outcome into a response.

use std::{collections::BTreeSet, time::Duration};

use axum::{
    Json,
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{HeaderValue, Method, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{AuthProviderState, AuthState, AuthUser},
    layout,
    models::{LoadingView, Role, User},
};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

// Pages are small JSON documents; anything larger is not a page.
const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

/// RouteGuardConfig
///
/// Which roles may pass. `None` or an empty set admits any authenticated user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteGuardConfig {
    pub allowed_roles: Option<BTreeSet<Role>>,
}

impl RouteGuardConfig {
    /// Any authenticated user.
    pub fn any_role() -> Self {
        Self::default()
    }

    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed_roles: Some(roles.into_iter().collect()),
        }
    }

    fn admits(&self, user: Option<&User>) -> bool {
        match &self.allowed_roles {
            Some(roles) if !roles.is_empty() => user.is_some_and(|u| roles.contains(&u.role)),
            _ => true,
        }
    }
}

/// GuardOutcome
///
/// Exactly one of these is produced per evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Authentication is unresolved; show the placeholder and do not navigate.
    Loading,
    /// Send the caller to the login view, remembering where they were going.
    RedirectToLogin { return_to: String },
    /// Authenticated, but the role is not admitted.
    RedirectToUnauthorized,
    /// Render the page inside the layout shell.
    Render,
}

/// Decides what the caller at `path` gets.
///
/// Loading is checked before authentication, so a pending resolution is never
/// mistaken for an anonymous caller, and authentication before roles, so an
/// anonymous caller never sees a role rejection.
pub fn evaluate(state: &AuthState, config: &RouteGuardConfig, path: &str) -> GuardOutcome {
    if state.is_loading {
        return GuardOutcome::Loading;
    }
    if !state.is_authenticated {
        return GuardOutcome::RedirectToLogin {
            return_to: path.to_string(),
        };
    }
    if !config.admits(state.user.as_ref()) {
        return GuardOutcome::RedirectToUnauthorized;
    }
    GuardOutcome::Render
}

/// `Location` of the login view carrying `return_to` as its `redirect` parameter.
pub fn login_location(return_to: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", urlencoding::encode(return_to))
}

/// GuardState
///
/// What one mounted guard needs: the shared provider, its timeout, and the role set
/// of the router it protects.
#[derive(Clone)]
pub struct GuardState {
    pub auth: AuthProviderState,
    pub resolve_timeout: Duration,
    pub config: RouteGuardConfig,
}

impl GuardState {
    pub fn new(app: &AppState, config: RouteGuardConfig) -> Self {
        Self {
            auth: app.auth.clone(),
            resolve_timeout: app.config.auth_resolve_timeout,
            config,
        }
    }
}

/// protected_route
///
/// Middleware mounted with `route_layer(middleware::from_fn_with_state(..))` on every
/// protected router. On `Render` it hands the admitted user to the handler as an
/// [`AuthUser`] extension and frames successful GET pages in the layout shell.
pub async fn protected_route(
    State(guard): State<GuardState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let path = requested_location(&parts);

    let state = resolve(&guard, &parts).await;
    let outcome = evaluate(&state, &guard.config, &path);
    tracing::debug!(%path, ?outcome, "route guard evaluated");

    match outcome {
        GuardOutcome::Loading => loading_placeholder(),
        GuardOutcome::RedirectToLogin { return_to } => {
            Redirect::to(&login_location(&return_to)).into_response()
        }
        GuardOutcome::RedirectToUnauthorized => Redirect::to(UNAUTHORIZED_PATH).into_response(),
        GuardOutcome::Render => {
            if let Some(user) = &state.user {
                parts.extensions.insert(AuthUser(user.clone()));
            }
            // axum answers HEAD with the GET handler, so it must see the same frame.
            let is_page = matches!(parts.method, Method::GET | Method::HEAD);
            let response = next.run(Request::from_parts(parts, body)).await;
            if is_page {
                frame(response, state.user.as_ref()).await
            } else {
                response
            }
        }
    }
}

/// Asks the provider, treating a resolution that outlives the timeout as still loading.
async fn resolve(guard: &GuardState, parts: &Parts) -> AuthState {
    match tokio::time::timeout(guard.resolve_timeout, guard.auth.resolve(parts)).await {
        Ok(state) => state,
        Err(_) => {
            tracing::warn!(
                timeout_ms = guard.resolve_timeout.as_millis() as u64,
                "auth provider did not resolve in time"
            );
            AuthState::loading()
        }
    }
}

/// Path and query as the client sent them. Nested routers see a stripped URI, so
/// the original one is preferred.
fn requested_location(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);

    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

fn loading_placeholder() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::RETRY_AFTER, HeaderValue::from_static("1"))],
        Json(LoadingView {
            status: "loading".to_string(),
            message: "Checking your session...".to_string(),
        }),
    )
        .into_response()
}

/// Wraps a successful JSON page in the layout shell. Anything else passes through.
async fn frame(response: Response, user: Option<&User>) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if !response.status().is_success() || !is_json {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_PAGE_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("failed to buffer page body: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let content = match serde_json::from_slice(&bytes) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("page body is not valid JSON: {e}");
            return (parts, Body::from(bytes)).into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    (parts, Json(layout::render(user, content))).into_response()
}
