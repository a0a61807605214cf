use serial_test::serial;
use staffdesk::{AppConfig, config::Env};
use std::{env, panic, time::Duration};

const VARS: &[&str] = &[
    "APP_ENV",
    "JWT_SECRET",
    "TOKEN_TTL_SECS",
    "AUTH_RESOLVE_TIMEOUT_MS",
    "BIND_ADDR",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with a clean slate of the config variables, restoring them afterward.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    unsafe {
        for var in VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn production_without_secret_fails_fast() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without JWT_SECRET"
    );
}

#[test]
#[serial]
fn local_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.jwt_secret, AppConfig::default().jwt_secret);
    assert_eq!(config.auth_resolve_timeout, Duration::from_millis(2_000));
    assert_eq!(config.token_ttl, Duration::from_secs(8 * 60 * 60));
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
}

#[test]
#[serial]
fn production_reads_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("JWT_SECRET", "prod-secret");
            env::set_var("AUTH_RESOLVE_TIMEOUT_MS", "750");
            env::set_var("TOKEN_TTL_SECS", "60");
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.auth_resolve_timeout, Duration::from_millis(750));
    assert_eq!(config.token_ttl, Duration::from_secs(60));
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
#[serial]
fn malformed_numbers_fall_back_to_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("AUTH_RESOLVE_TIMEOUT_MS", "soon");
        }
        AppConfig::load()
    });

    assert_eq!(config.auth_resolve_timeout, Duration::from_millis(2_000));
}

#[test]
#[serial]
fn oversized_token_ttl_is_capped() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("TOKEN_TTL_SECS", u64::MAX.to_string());
        }
        AppConfig::load()
    });

    assert_eq!(config.token_ttl, Duration::from_secs(30 * 24 * 60 * 60));
}
