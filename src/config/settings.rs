//! Runtime settings, read once from the process environment (and `.env`).

use std::env;
use std::fmt;
use std::str::FromStr;

use super::constants::{
    DEFAULT_APP_ENV, DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REDIS_URL,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEV_JWT_SECRET, ENV_PRODUCTION,
    MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// `APP_ENV`, or `NODE_ENV` for older deployments
    pub app_env: String,
    /// Only origin allowed by CORS; unset means any
    pub frontend_url: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server_addr())
            .field("app_env", &self.app_env)
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("frontend_url", &self.frontend_url)
            .finish_non_exhaustive()
    }
}

fn text(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn number<T: FromStr>(key: &str, fallback: T) -> AppResult<T> {
    match text(key) {
        None => Ok(fallback),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::internal(format!("{} is not a valid number: {}", key, raw))),
    }
}

impl Config {
    /// Read settings, falling back to local-development defaults.
    ///
    /// Only a debug build may run without `JWT_SECRET`.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match text("JWT_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET unset, signing tokens with the development key");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(AppError::internal("JWT_SECRET must be set")),
        };
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: text("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            redis_url: text("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.into()),
            jwt_secret,
            jwt_expiration_hours: number("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS)?,
            server_host: text("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.into()),
            server_port: number("PORT", DEFAULT_SERVER_PORT)
                .and_then(|port| number("SERVER_PORT", port))?,
            app_env: text("APP_ENV")
                .or_else(|| text("NODE_ENV"))
                .unwrap_or_else(|| DEFAULT_APP_ENV.into()),
            frontend_url: text("FRONTEND_URL"),
        })
    }

    /// Development settings signed with `jwt_secret`; reads nothing.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            redis_url: DEFAULT_REDIS_URL.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.into(),
            server_port: DEFAULT_SERVER_PORT,
            app_env: DEFAULT_APP_ENV.into(),
            frontend_url: None,
        }
    }

    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Hides error diagnostics and reset codes.
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case(ENV_PRODUCTION)
    }

    /// Echoes password reset codes back to the caller.
    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case(DEFAULT_APP_ENV)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_flags() {
        let mut config = Config::for_tests(DEV_JWT_SECRET);
        assert!(config.is_development());
        assert!(!config.is_production());

        config.app_env = "Production".into();
        assert!(config.is_production());
        assert!(!config.is_development());
    }

    #[test]
    fn test_debug_omits_secrets() {
        let config = Config::for_tests(DEV_JWT_SECRET);
        let printed = format!("{:?}", config);
        assert!(!printed.contains(DEV_JWT_SECRET));
        assert!(!printed.contains("postgres://"));
        assert!(printed.contains("0.0.0.0:5000"));
    }
}
