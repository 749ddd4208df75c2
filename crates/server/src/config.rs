use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use registrar_core::domain::{CreditPolicy, DEFAULT_COURSE_CAPACITY, DEFAULT_MIN_CREDITS};
use serde::Deserialize;
use tracing::info;

use crate::auth::MAX_TOKEN_TTL_MINUTES;

type Result<T> = anyhow::Result<T>;

pub const DEFAULT_CONFIG_PATH: &str = "registrar.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrarConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl RegistrarConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("failed to deserialize registrar config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` when it exists, falls back to defaults otherwise, then
    /// applies `DATABASE_URL`, `REGISTRAR_BIND` and `REGISTRAR_JWT_SECRET`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            info!(path = %path.display(), "loading registrar config");
            Self::from_file(path)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(bind) = lookup("REGISTRAR_BIND") {
            self.bind_addr = bind;
        }
        if let Some(secret) = lookup("REGISTRAR_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("auth.jwt_secret must not be empty");
        }
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.auth.token_ttl_minutes) {
            bail!(
                "auth.token_ttl_minutes must be in 1..={MAX_TOKEN_TTL_MINUTES}, got {}",
                self.auth.token_ttl_minutes
            );
        }
        if let Some(max) = self.registration.max_credits
            && max < self.registration.min_credits
        {
            bail!(
                "registration.max_credits ({max}) is below registration.min_credits ({})",
                self.registration.min_credits
            );
        }
        if !(0.0..=1.0).contains(&self.seed.backlog_probability) {
            bail!(
                "seed.backlog_probability must be in [0, 1], got {}",
                self.seed.backlog_probability
            );
        }
        Ok(())
    }
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_url: default_database_url(),
            auth: AuthConfig::default(),
            registration: RegistrationConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
}

impl AuthConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == default_jwt_secret()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_minutes: default_token_ttl_minutes(),
            hash_memory_kib: default_hash_memory_kib(),
            hash_iterations: default_hash_iterations(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    #[serde(default = "default_min_credits")]
    pub min_credits: u32,
    #[serde(default)]
    pub max_credits: Option<u32>,
    #[serde(default = "default_enforce_capacity")]
    pub enforce_capacity: bool,
    #[serde(default = "default_capacity")]
    pub default_capacity: u32,
}

impl RegistrationConfig {
    pub fn credit_policy(&self) -> CreditPolicy {
        CreditPolicy::new(self.min_credits, self.max_credits)
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            min_credits: default_min_credits(),
            max_credits: None,
            enforce_capacity: default_enforce_capacity(),
            default_capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_seed_enabled")]
    pub enabled: bool,
    #[serde(default = "default_backlog_probability")]
    pub backlog_probability: f64,
    #[serde(default = "default_cohort_size")]
    pub cohort_size: u32,
    /// Replaces the built-in catalog when set.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_seed_enabled(),
            backlog_probability: default_backlog_probability(),
            cohort_size: default_cohort_size(),
            catalog_path: None,
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_database_url() -> String {
    "sqlite://registrar.db?mode=rwc".to_string()
}

fn default_jwt_secret() -> String {
    "registrar-dev-secret".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    60
}

fn default_hash_memory_kib() -> u32 {
    19_456
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_min_credits() -> u32 {
    DEFAULT_MIN_CREDITS
}

fn default_enforce_capacity() -> bool {
    true
}

fn default_capacity() -> u32 {
    DEFAULT_COURSE_CAPACITY
}

fn default_seed_enabled() -> bool {
    true
}

fn default_backlog_probability() -> f64 {
    0.10
}

fn default_cohort_size() -> u32 {
    8
}

#[cfg(test)]
mod tests {
    use super::RegistrarConfig;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RegistrarConfig::from_str("").expect("empty config should parse");

        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.database_url, "sqlite://registrar.db?mode=rwc");
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.registration.min_credits, 20);
        assert_eq!(config.registration.max_credits, None);
        assert!(config.registration.enforce_capacity);
        assert_eq!(config.registration.default_capacity, 30);
        assert!(config.seed.enabled);
        assert_eq!(config.seed.backlog_probability, 0.10);
        assert_eq!(config.seed.cohort_size, 8);
        assert!(config.auth.uses_default_secret());
    }

    #[test]
    fn test_parse_config() {
        let raw = r#"
bind_addr = "127.0.0.1:9000"
database_url = "sqlite::memory:"

[auth]
jwt_secret = "s3cret"
token_ttl_minutes = 15

[registration]
min_credits = 18
max_credits = 26
enforce_capacity = false

[seed]
enabled = false
backlog_probability = 0.25
catalog_path = "catalog.toml"
"#;

        let config = RegistrarConfig::from_str(raw).expect("config should parse");

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.token_ttl_minutes, 15);
        assert_eq!(config.auth.hash_iterations, 2);
        assert_eq!(config.registration.credit_policy().min, 18);
        assert_eq!(config.registration.credit_policy().max, Some(26));
        assert!(!config.registration.enforce_capacity);
        assert!(!config.seed.enabled);
        assert_eq!(
            config.seed.catalog_path.as_deref(),
            Some(std::path::Path::new("catalog.toml"))
        );
    }

    #[test]
    fn test_rejects_out_of_range_backlog_probability() {
        let err = RegistrarConfig::from_str("[seed]\nbacklog_probability = 1.5\n")
            .expect_err("probability above 1 should fail");

        assert!(err.to_string().contains("backlog_probability"));
    }

    #[test]
    fn test_rejects_token_ttl_outside_supported_range() {
        for ttl in ["0", "-5", "9223372036854775807"] {
            let err = RegistrarConfig::from_str(&format!("[auth]\ntoken_ttl_minutes = {ttl}\n"))
                .expect_err("token ttl should be rejected");

            assert!(err.to_string().contains("token_ttl_minutes"));
        }
        assert!(RegistrarConfig::from_str("[auth]\ntoken_ttl_minutes = 43200\n").is_ok());
    }

    #[test]
    fn test_rejects_max_below_min_credits() {
        assert!(RegistrarConfig::from_str("[registration]\nmax_credits = 10\n").is_err());
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = RegistrarConfig::default();
        config.apply_overrides(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "REGISTRAR_JWT_SECRET" => Some("from-env".to_string()),
            _ => None,
        });

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.auth.jwt_secret, "from-env");
    }
}
