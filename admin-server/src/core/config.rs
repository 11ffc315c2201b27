use crate::auth::{JwtConfig, generate_printable_secret};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Minimum accepted length for `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_PATH | data/admin.db | SQLite file |
/// | HTTP_HOST | 0.0.0.0 | listen host |
/// | HTTP_PORT | 8080 | listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | JWT_SECRET | generated in development | HMAC key, >= 32 chars |
/// | JWT_EXPIRATION_MINUTES | 10080 | token TTL (7 days) |
/// | JWT_ISSUER | admin-server | `iss` claim |
/// | JWT_AUDIENCE | admin-console | `aud` claim |
/// | SEED_DEMO_USERS | true in development | seed demo accounts |
/// | LOG_LEVEL | info | default filter level |
/// | LOG_DIR | unset | daily log files directory |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_host: String,
    pub http_port: u16,
    pub environment: String,
    pub jwt: JwtConfig,
    /// `JWT_SECRET` was absent and a development key was generated
    pub jwt_secret_generated: bool,
    pub seed_demo_users: bool,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Fails only on a missing or too-short `JWT_SECRET` outside development.
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_dev = environment == "development";

        let (secret, jwt_secret_generated) = Self::jwt_secret(&environment)?;
        let jwt = JwtConfig {
            secret,
            expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", 7 * 24 * 60),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "admin-server".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "admin-console".into()),
        };

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/admin.db".into()),
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: env_parse("HTTP_PORT", 8080),
            jwt,
            jwt_secret_generated,
            seed_demo_users: env_parse("SEED_DEMO_USERS", is_dev),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment,
        })
    }

    /// `JWT_SECRET`: required outside development, generated otherwise
    ///
    /// Runs before logging is up, so the generated case is reported to the caller.
    fn jwt_secret(environment: &str) -> Result<(String, bool), BoxError> {
        match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_JWT_SECRET_LEN => Ok((secret, false)),
            Ok(_) => Err(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long"
            )
            .into()),
            Err(_) if environment == "development" => Ok((generate_printable_secret()?, true)),
            Err(_) => Err(format!("JWT_SECRET must be set in {environment} environment").into()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Configuration for tests: in-memory friendly, fixed secret, no demo users
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_host: "127.0.0.1".into(),
            http_port: 0,
            environment: "test".into(),
            jwt: JwtConfig {
                secret: "test-secret-key-that-is-long-enough-0123456789".into(),
                expiration_minutes: 60,
                issuer: "admin-server".into(),
                audience: "admin-console".into(),
            },
            jwt_secret_generated: false,
            seed_demo_users: false,
            log_level: "debug".into(),
            log_dir: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tests_config() {
        let config = Config::for_tests();
        assert!(config.jwt.secret.len() >= MIN_JWT_SECRET_LEN);
        assert!(!config.is_production());
        assert!(!config.seed_demo_users);
        assert!(!config.jwt_secret_generated);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        assert_eq!(env_parse("ADMIN_SERVER_TEST_UNSET_VAR", 42u16), 42);
    }
}
