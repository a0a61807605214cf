use std::{env, time::Duration};

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is immutable once
/// loaded and is pulled into handlers and middleware via `FromRef`, the same way the
/// repository and the authentication provider are.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the `x-user-id` development bypass and log format.
    pub env: Env,
    // HMAC secret used to sign and verify session tokens.
    pub jwt_secret: String,
    // Lifetime of a token issued by POST /login.
    pub token_ttl: Duration,
    // Upper bound on how long the guard waits for the auth provider before
    // answering with the loading placeholder.
    pub auth_resolve_timeout: Duration,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context: developer conveniences in `Local`, hardened auth and
/// JSON logs in `Production`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "staffdesk-local-development-secret";
const DEFAULT_TOKEN_TTL_SECS: u64 = 8 * 60 * 60;
const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_AUTH_RESOLVE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration used for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            auth_resolve_timeout: Duration::from_millis(DEFAULT_AUTH_RESOLVE_TIMEOUT_MS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables at startup.
    ///
    /// # Panics
    /// Panics in `production` when `JWT_SECRET` is missing, so the service never starts
    /// signing tokens with the well-known local secret.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        Self {
            env,
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs()),
            auth_resolve_timeout: Duration::from_millis(read_u64(
                "AUTH_RESOLVE_TIMEOUT_MS",
                DEFAULT_AUTH_RESOLVE_TIMEOUT_MS,
            )),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}

/// Session lifetime in seconds, capped at thirty days.
fn token_ttl_secs() -> u64 {
    let secs = read_u64("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS);
    if secs > MAX_TOKEN_TTL_SECS {
        tracing::warn!(secs, max = MAX_TOKEN_TTL_SECS, "capping TOKEN_TTL_SECS");
    }
    secs.min(MAX_TOKEN_TTL_SECS)
}

/// Parses a numeric variable, falling back to `default` when unset or malformed.
fn read_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring malformed numeric setting");
            default
        }),
        Err(_) => default,
    }
}
