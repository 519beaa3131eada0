use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub hashing: HashingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; falls back to `DATABASE_URL`
    pub url: Option<String>,
    pub max_connections: u32,
    /// Apply pending migrations before provisioning
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Where user records are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    /// Process-local store, discarded on exit (dry runs)
    #[serde(alias = "in-memory", alias = "in_memory")]
    Memory,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 1,
            run_migrations: true,
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load layered configuration, with an optional extra file above the
    /// defaults and below the environment
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_database_url_fallback(std::env::var("DATABASE_URL").ok());

        Ok(app_config)
    }

    /// Use `fallback` as the database URL unless one is already configured
    fn apply_database_url_fallback(&mut self, fallback: Option<String>) {
        if self.database.url.is_none() {
            self.database.url = fallback;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn write_config_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "account-provisioner-{}-{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_config_file_overrides_defaults() {
        let path = write_config_file(
            "override",
            r#"
[storage]
backend = "memory"

[hashing]
iterations = 7

[database]
url = "postgres://file@localhost/accounts"
"#,
        );

        let config = AppConfig::load_from(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.hashing.iterations, 7);
        assert_eq!(config.hashing.parallelism, 1);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://file@localhost/accounts")
        );
    }

    #[test]
    fn test_load_from_missing_config_file_fails() {
        let path = std::env::temp_dir().join("account-provisioner-does-not-exist.toml");

        assert!(AppConfig::load_from(path.to_str()).is_err());
    }

    #[test]
    fn test_database_url_fallback_fills_unset_url() {
        let mut config = AppConfig::default();

        config.apply_database_url_fallback(Some("postgres://env@localhost/db".to_string()));

        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://env@localhost/db")
        );
    }

    #[test]
    fn test_database_url_fallback_keeps_configured_url() {
        let mut config = AppConfig::default();
        config.database.url = Some("postgres://file@localhost/db".to_string());

        config.apply_database_url_fallback(Some("postgres://env@localhost/db".to_string()));
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://file@localhost/db")
        );

        let mut unset = AppConfig::default();
        unset.apply_database_url_fallback(None);
        assert!(unset.database.url.is_none());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.database.max_connections, 1);
        assert!(config.database.run_migrations);
        assert_eq!(config.hashing.memory_kib, 19_456);
        assert_eq!(config.hashing.iterations, 2);
        assert_eq!(config.hashing.parallelism, 1);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_sources_keep_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("storage.backend", "memory")
            .unwrap()
            .set_override("hashing.iterations", 3)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.hashing.iterations, 3);
        assert_eq!(config.hashing.memory_kib, 19_456);
        assert!(config.database.run_migrations);
    }

    #[test]
    fn test_backend_aliases() {
        let config: AppConfig = config::Config::builder()
            .set_override("storage.backend", "pg")
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(matches!(config.logging.format, LogFormat::Json));
    }
}
