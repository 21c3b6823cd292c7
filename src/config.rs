use std::path::Path;
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::database::QueryContext;
use crate::error::{QueryError, Result};
use crate::version::{PostgresVersion, VersionGate};

/// Environment variable for each configuration key. `database_url` falls back to
/// `DATABASE_URL`, and `environment` is `PGSTAT_ENV` so logging reads the same variable.
const ENV_VARS: [(&str, &str); 5] = [
    ("database_url", "PGSTAT_DATABASE_URL"),
    ("postgres_version", "PGSTAT_POSTGRES_VERSION"),
    ("max_connections", "PGSTAT_MAX_CONNECTIONS"),
    ("statement_timeout_ms", "PGSTAT_STATEMENT_TIMEOUT_MS"),
    ("environment", "PGSTAT_ENV"),
];

/// `(key, value)` for every configuration key set in the environment.
fn env_overrides(lookup: impl Fn(&str) -> Option<String>) -> Vec<(&'static str, String)> {
    ENV_VARS
        .iter()
        .filter_map(|(key, var)| {
            let value = match *key {
                "database_url" => lookup(var).or_else(|| lookup("DATABASE_URL")),
                _ => lookup(var),
            };
            value.map(|value| (*key, value))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub database_url: String,
    /// Server generation to build views for. Left unset, the default is applied lazily
    /// the first time a runner is created.
    pub postgres_version: Option<PostgresVersion>,
    pub max_connections: u32,
    pub statement_timeout_ms: Option<u64>,
    pub environment: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            database_url: "postgresql://localhost/postgres".to_string(),
            postgres_version: None,
            max_connections: 5,
            statement_timeout_ms: None,
            environment: "development".to_string(),
        }
    }
}

impl QueryConfig {
    /// Defaults overridden by the process environment: `PGSTAT_DATABASE_URL` (falling back
    /// to `DATABASE_URL`), `PGSTAT_POSTGRES_VERSION`, `PGSTAT_MAX_CONNECTIONS`,
    /// `PGSTAT_STATEMENT_TIMEOUT_MS`, and `PGSTAT_ENV`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        for (key, value) in env_overrides(lookup) {
            config.apply_override(key, value)?;
        }
        Ok(config)
    }

    fn apply_override(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "database_url" => self.database_url = value,
            "postgres_version" => self.postgres_version = Some(value.parse()?),
            "max_connections" => {
                self.max_connections = value.parse().map_err(|e| {
                    QueryError::Configuration(format!("Invalid max_connections: {e}"))
                })?;
            }
            "statement_timeout_ms" => {
                self.statement_timeout_ms = Some(value.parse().map_err(|e| {
                    QueryError::Configuration(format!("Invalid statement_timeout_ms: {e}"))
                })?);
            }
            "environment" => self.environment = value,
            other => {
                return Err(QueryError::Configuration(format!(
                    "unknown configuration key: {other}"
                )))
            }
        }
        Ok(())
    }

    /// Layer defaults, an optional config file, and the environment variables read by
    /// [`from_env`](QueryConfig::from_env), in that order of precedence.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    fn load_with(path: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            debug!(path = %path.display(), "loading query configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }
        for (key, value) in env_overrides(lookup) {
            builder = builder
                .set_override(key, value)
                .map_err(|e| QueryError::Configuration(e.to_string()))?;
        }

        let config = builder
            .build()
            .and_then(|built| built.try_deserialize::<Self>())
            .map_err(|e| QueryError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(QueryError::Configuration(
                "database_url must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(QueryError::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }

    /// A context bounded by the configured statement timeout, if any.
    pub fn query_context(&self) -> QueryContext {
        match self.statement_timeout() {
            Some(timeout) => QueryContext::new().with_timeout(timeout),
            None => QueryContext::new(),
        }
    }

    /// Lock the configured version into `gate`. A config without a version leaves the
    /// gate untouched.
    pub fn apply_version(&self, gate: &VersionGate) -> Result<()> {
        match self.postgres_version {
            Some(version) => gate.set(version),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = QueryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.statement_timeout(), None);
        assert_eq!(config.query_context().timeout(), None);
    }

    #[test]
    fn test_statement_timeout_feeds_context() {
        let config = QueryConfig {
            statement_timeout_ms: Some(1500),
            ..QueryConfig::default()
        };
        assert_eq!(
            config.query_context().timeout(),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_zero_connections_rejected() {
        let config = QueryConfig {
            max_connections: 0,
            ..QueryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(QueryError::Configuration(_))
        ));
    }

    #[test]
    fn test_apply_version() {
        let gate = VersionGate::new();
        QueryConfig::default().apply_version(&gate).unwrap();
        assert!(!gate.is_set());

        let config = QueryConfig {
            postgres_version: Some(PostgresVersion::Postgres9),
            ..QueryConfig::default()
        };
        config.apply_version(&gate).unwrap();
        assert_eq!(gate.get(), Some(PostgresVersion::Postgres9));
        assert!(matches!(
            config.apply_version(&gate),
            Err(QueryError::VersionAlreadySet { .. })
        ));
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_invalid_env_value() {
        let err =
            QueryConfig::from_lookup(lookup(&[("PGSTAT_STATEMENT_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("statement_timeout_ms"));
    }

    #[test]
    fn test_database_url_prefers_prefixed_variable() {
        let fallback = QueryConfig::from_lookup(lookup(&[("DATABASE_URL", "postgresql://a/db")]))
            .unwrap();
        assert_eq!(fallback.database_url, "postgresql://a/db");

        let both = lookup(&[
            ("DATABASE_URL", "postgresql://a/db"),
            ("PGSTAT_DATABASE_URL", "postgresql://b/db"),
        ]);
        assert_eq!(
            QueryConfig::from_lookup(both).unwrap().database_url,
            "postgresql://b/db"
        );
    }

    #[test]
    fn test_from_env_and_load_read_the_same_variables() {
        let vars = [
            ("DATABASE_URL", "postgresql://monitor@db/postgres"),
            ("PGSTAT_ENV", "production"),
            ("PGSTAT_POSTGRES_VERSION", "9.6"),
            ("PGSTAT_MAX_CONNECTIONS", "3"),
            ("PGSTAT_STATEMENT_TIMEOUT_MS", "250"),
        ];

        let from_env = QueryConfig::from_lookup(lookup(&vars)).unwrap();
        let loaded = QueryConfig::load_with(None, lookup(&vars)).unwrap();

        assert_eq!(from_env, loaded);
        assert_eq!(loaded.environment, "production");
        assert_eq!(loaded.database_url, "postgresql://monitor@db/postgres");
        assert_eq!(loaded.postgres_version, Some(PostgresVersion::Postgres9));
        assert_eq!(loaded.max_connections, 3);
        assert_eq!(loaded.statement_timeout_ms, Some(250));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"environment = \"staging\"\nmax_connections = 7\n")
            .unwrap();

        let config =
            QueryConfig::load_with(Some(file.path()), lookup(&[("PGSTAT_ENV", "test")])).unwrap();
        assert_eq!(config.environment, "test");
        assert_eq!(config.max_connections, 7);
    }
}
