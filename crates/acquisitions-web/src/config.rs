use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Sentinel database URL that selects the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => anyhow::bail!("unknown environment: {other}"),
        }
    }
}

/// `live` enforces denials; `dry_run` only logs them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    #[default]
    Live,
    DryRun,
}

impl std::str::FromStr for SecurityMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(SecurityMode::Live),
            "dry_run" | "dry-run" => Ok(SecurityMode::DryRun),
            other => anyhow::bail!("unknown security mode: {other}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub tls: TlsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl_hours")]
    pub jwt_ttl_hours: u64,
    #[serde(default = "default_cookie_max_age_secs")]
    pub cookie_max_age_secs: u64,
}

/// Per-role sliding-window limits. Guests are unauthenticated callers.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub mode: SecurityMode,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_admin_limit")]
    pub admin_limit: u32,
    #[serde(default = "default_user_limit")]
    pub user_limit: u32,
    #[serde(default = "default_guest_limit")]
    pub guest_limit: u32,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`. Only
    /// safe behind a reverse proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}
fn default_max_connections() -> u32 { acquisitions_core::store::postgres::DEFAULT_MAX_CONNECTIONS }
fn default_jwt_ttl_hours() -> u64 { 24 }
fn default_cookie_max_age_secs() -> u64 { 15 * 60 }
fn default_window_secs() -> u64 { 60 }
fn default_admin_limit() -> u32 { 100 }
fn default_user_limit() -> u32 { 50 }
fn default_guest_limit() -> u32 { 20 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_ttl_hours: default_jwt_ttl_hours(),
            cookie_max_age_secs: default_cookie_max_age_secs(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            mode: SecurityMode::default(),
            window_secs: default_window_secs(),
            admin_limit: default_admin_limit(),
            user_limit: default_user_limit(),
            guest_limit: default_guest_limit(),
            trust_proxy: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: Environment::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            cors: CorsConfig::default(),
            tls: TlsConfig::default(),
        }
    }
}

const WEAK_SECRETS: &[&str] = &[
    "change-me-to-a-random-secret",
    "your-secret-key",
    "secret",
    "password",
    "jwt-secret",
];

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls.cert_path.is_some() && self.tls.key_path.is_some()
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database.url.as_deref() == Some(MEMORY_DATABASE_URL)
    }

    /// Reads `ACQ_CONFIG` (if set), applies environment overrides and
    /// validates the result.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("ACQ_CONFIG").map(PathBuf::from).ok();

        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => ServerConfig::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.finalize()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("ACQ_BIND_ADDR") {
            self.bind_addr = addr.parse()?;
        }
        if let Some(env) = lookup("ACQ_ENV") {
            self.environment = env.parse()?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(secret) = lookup("ACQ_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(hours) = lookup("ACQ_JWT_TTL_HOURS") {
            self.auth.jwt_ttl_hours = hours.parse()?;
        }
        if let Some(mode) = lookup("ACQ_SECURITY_MODE") {
            self.security.mode = mode.parse()?;
        }
        if let Some(trust) = lookup("ACQ_TRUST_PROXY") {
            self.security.trust_proxy = trust.parse()?;
        }
        if let Some(origins) = lookup("ACQ_CORS_ORIGINS") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(cert) = lookup("ACQ_TLS_CERT") {
            self.tls.cert_path = Some(cert);
        }
        if let Some(key) = lookup("ACQ_TLS_KEY") {
            self.tls.key_path = Some(key);
        }
        Ok(())
    }

    /// Checks required settings and fills in a JWT secret when none is set.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if self.database.url.as_deref().map_or(true, str::is_empty) {
            anyhow::bail!(
                "DATABASE_URL is missing. Set it in the environment or in [database] url \
                 (use \"{MEMORY_DATABASE_URL}\" for an in-memory store)."
            );
        }

        if self.auth.jwt_secret.is_empty() {
            if self.is_production() {
                anyhow::bail!("ACQ_JWT_SECRET must be set in production.");
            }
            self.auth.jwt_secret = uuid::Uuid::new_v4().to_string();
            tracing::warn!(
                "No JWT secret configured. Generated random secret (will change on restart)."
            );
        }

        if WEAK_SECRETS.iter().any(|&w| self.auth.jwt_secret == w) {
            anyhow::bail!(
                "JWT secret matches a known weak/placeholder value. \
                 Set a strong random secret via ACQ_JWT_SECRET environment variable."
            );
        }
        if self.auth.jwt_secret.len() < 32 {
            tracing::warn!(
                "JWT secret is shorter than 32 characters. \
                 Consider using a stronger secret via ACQ_JWT_SECRET."
            );
        }

        if self.security.window_secs == 0 {
            anyhow::bail!("security.window_secs must be greater than zero");
        }

        if self.uses_memory_store() {
            tracing::warn!("Database connection skipped: using in-memory user store");
        }

        Ok(())
    }
}
