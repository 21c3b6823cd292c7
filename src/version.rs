//! # Server Version Gate
//!
//! Which PostgreSQL generation the queryable views are built against.
//!
//! A [`VersionGate`] is a set-once latch: the first successful [`VersionGate::set`] wins and
//! every later attempt fails with [`QueryError::VersionAlreadySet`] without touching the
//! stored value. Concurrent setters race on the underlying `OnceLock`, so exactly one of
//! them succeeds and readers never observe a partial write.
//!
//! The process-wide gate behind [`set_postgres_version`] exists for callers that want a
//! single global choice. Everything below it (views, compiler, runner) takes the version as
//! an explicit value, so a gate can also be created locally and threaded through.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QueryError, Result};

/// Supported PostgreSQL generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostgresVersion {
    #[serde(rename = "9.6", alias = "9")]
    Postgres9,
    #[serde(rename = "13")]
    Postgres13,
}

/// Applied when a query is built before any version was chosen.
pub const DEFAULT_POSTGRES_VERSION: PostgresVersion = PostgresVersion::Postgres13;

impl PostgresVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostgresVersion::Postgres9 => "9.6",
            PostgresVersion::Postgres13 => "13",
        }
    }
}

impl fmt::Display for PostgresVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostgresVersion {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "9" | "9.6" => Ok(PostgresVersion::Postgres9),
            "13" => Ok(PostgresVersion::Postgres13),
            other => Err(QueryError::Configuration(format!(
                "unsupported postgres version: {other}"
            ))),
        }
    }
}

/// Set-once holder of the active [`PostgresVersion`].
#[derive(Debug, Default)]
pub struct VersionGate {
    version: OnceLock<PostgresVersion>,
}

impl VersionGate {
    pub const fn new() -> Self {
        Self {
            version: OnceLock::new(),
        }
    }

    /// Lock down the version. Only the first call succeeds.
    pub fn set(&self, version: PostgresVersion) -> Result<()> {
        match self.version.set(version) {
            Ok(()) => {
                debug!(version = %version, "postgres version set");
                Ok(())
            }
            Err(_) => {
                let current = self.get().unwrap_or(version);
                warn!(requested = %version, current = %current, "postgres version already set");
                Err(QueryError::VersionAlreadySet { current })
            }
        }
    }

    pub fn is_set(&self) -> bool {
        self.version.get().is_some()
    }

    pub fn get(&self) -> Option<PostgresVersion> {
        self.version.get().copied()
    }

    /// The set version, applying [`DEFAULT_POSTGRES_VERSION`] first if nothing was set.
    pub fn get_or_default(&self) -> PostgresVersion {
        *self.version.get_or_init(|| {
            debug!(
                version = %DEFAULT_POSTGRES_VERSION,
                "no postgres version set, applying default"
            );
            DEFAULT_POSTGRES_VERSION
        })
    }
}

static PROCESS_GATE: VersionGate = VersionGate::new();

/// The process-wide gate.
pub fn process_gate() -> &'static VersionGate {
    &PROCESS_GATE
}

/// Set the process-wide version. Fails if it was already set, explicitly or by default.
pub fn set_postgres_version(version: PostgresVersion) -> Result<()> {
    PROCESS_GATE.set(version)
}

/// The process-wide version, if one has been set.
pub fn postgres_version() -> Option<PostgresVersion> {
    PROCESS_GATE.get()
}
