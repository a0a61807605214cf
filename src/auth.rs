use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    models::{Role, User},
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the session token issued by POST /login. The role is informational;
/// the provider always re-reads it from the directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

/// AuthState
///
/// The current resolution of who (if anyone) is logged in, and whether that
/// resolution is still pending. Produced by an `AuthProvider`, only read by the guard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user: Option<User>,
}

impl AuthState {
    /// Resolution has not finished yet.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            is_authenticated: false,
            user: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
            user: Some(user),
        }
    }
}

/// AuthProvider
///
/// The seam between the guard and whatever knows who the caller is. Implementations
/// must not fail: anything that is not a positive identification is `anonymous()`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn resolve(&self, parts: &Parts) -> AuthState;
}

/// AuthProviderState
///
/// The concrete type used to share the provider across the application state.
pub type AuthProviderState = Arc<dyn AuthProvider>;

/// JwtAuthProvider
///
/// Resolves callers from an `Authorization: Bearer <jwt>` header signed with the
/// configured secret. The subject must still exist in the directory, so deleting a
/// user revokes their outstanding tokens.
pub struct JwtAuthProvider {
    repo: RepositoryState,
    env: Env,
    decoding_key: DecodingKey,
}

impl JwtAuthProvider {
    pub fn new(repo: RepositoryState, config: &AppConfig) -> Self {
        Self {
            repo,
            env: config.env.clone(),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Local development bypass: `x-user-id: <uuid>` of a directory user.
    async fn resolve_bypass(&self, parts: &Parts) -> Option<User> {
        let raw = parts.headers.get("x-user-id")?.to_str().ok()?;
        let user_id = Uuid::parse_str(raw).ok()?;
        self.repo.get_user(user_id).await
    }

    async fn resolve_bearer(&self, parts: &Parts) -> Option<User> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))?;

        let mut validation = Validation::default();
        validation.validate_exp = true;

        let claims = match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "rejected bearer token");
                return None;
            }
        };

        self.repo.get_user(claims.sub).await
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn resolve(&self, parts: &Parts) -> AuthState {
        if self.env == Env::Local {
            if let Some(user) = self.resolve_bypass(parts).await {
                return AuthState::authenticated(user);
            }
        }

        match self.resolve_bearer(parts).await {
            Some(user) => AuthState::authenticated(user),
            None => AuthState::anonymous(),
        }
    }
}

/// StaticAuthProvider
///
/// Hands out a fixed state for every request. `never_resolves()` models a provider
/// that is stuck, which exercises the guard's resolution timeout.
#[derive(Clone, Debug)]
pub struct StaticAuthProvider {
    state: Option<AuthState>,
}

impl StaticAuthProvider {
    pub fn new(state: AuthState) -> Self {
        Self { state: Some(state) }
    }

    pub fn never_resolves() -> Self {
        Self { state: None }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn resolve(&self, _parts: &Parts) -> AuthState {
        match &self.state {
            Some(state) => state.clone(),
            None => std::future::pending().await,
        }
    }
}

/// issue_token
///
/// Signs a session token for `user` that expires after `ttl`.
pub fn issue_token(
    user: &User,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let expires = now
        .checked_add(ttl)
        .ok_or_else(|| ErrorKind::InvalidClaimFormat("exp".to_string()))?;

    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now.as_secs() as usize,
        exp: expires.as_secs() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

// --- Password helpers ---

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Returns false for a wrong password and for an unparseable hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("stored password hash is invalid: {e}");
            false
        }
    }
}

/// AuthUser
///
/// The identity the route guard admitted. The guard inserts it into request
/// extensions before running a protected handler; handlers take it as an argument.
///
/// Rejection: 401 when used on a route that is not behind the guard.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
