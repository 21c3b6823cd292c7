//! # Queryable Views
//!
//! One ready-made [`Queryable`] per well-known view, wired to the column lists of a given
//! server generation.
//!
//! Views that do not exist in a generation are still present, but carry
//! [`Target::Unspecified`] and no specifier, so compiling them (or joining them) fails
//! with [`QueryError::UnsupportedTarget`](crate::QueryError::UnsupportedTarget).
//!
//! Supported joins:
//!
//! ```text
//! pg_stat_activity      -> pg_locks (pid), pg_locks (backend_xid), pg_stat_ssl, pg_stat_gssapi,
//!                          pg_stat_wal_receiver, pg_stat_subscription, pg_stat_database,
//!                          pg_stat_database_conflicts, pg_blocking_pids(pid)
//! pg_stat_replication   -> pg_locks, pg_stat_ssl, pg_stat_gssapi, pg_stat_wal_receiver
//! pg_stat_user_tables   -> pg_locks, pg_stat_user_indexes, pg_stat_subscription,
//!                          pg_statio_user_indexes, pg_statio_user_sequences, pg_statio_user_tables
//! pg_locks              -> pg_stat_activity, pg_stat_database, pg_stat_user_tables,
//!                          pg_stat_user_indexes, pg_statio_user_tables, pg_statio_user_indexes,
//!                          pg_statio_user_sequences
//! pg_stat_ssl           -> pg_locks, pg_stat_activity
//! pg_stat_gssapi        -> pg_locks, pg_stat_activity
//! pg_stat_wal_receiver  -> pg_locks, pg_stat_activity
//! pg_stat_subscription  -> pg_locks, pg_stat_activity
//! pg_stat_database      -> pg_stat_database_conflicts, pg_locks, pg_stat_activity
//! pg_stat_user_indexes  -> pg_stat_user_tables, pg_statio_user_tables, pg_locks,
//!                          pg_statio_user_indexes
//! ```

use crate::query_builder::{Queryable, Target};
use crate::schema::{postgres13, postgres9};
use crate::version::{process_gate, PostgresVersion};

/// The queryable views for one server generation.
#[derive(Debug, Clone)]
pub struct Views {
    version: PostgresVersion,
    pub locks: Queryable,
    pub locks_on_tx_id: Queryable,
    pub stat_activity: Queryable,
    pub stat_replication: Queryable,
    pub stat_ssl: Queryable,
    pub stat_gssapi: Queryable,
    pub stat_wal_receiver: Queryable,
    pub stat_subscription: Queryable,
    pub stat_database: Queryable,
    pub stat_database_conflicts: Queryable,
    pub stat_user_tables: Queryable,
    pub stat_user_indexes: Queryable,
    pub statio_user_indexes: Queryable,
    pub statio_user_sequences: Queryable,
    pub statio_user_tables: Queryable,
    pub stat_user_functions: Queryable,
    pub stat_archiver: Queryable,
    pub stat_bgwriter: Queryable,
    pub stat_slru: Queryable,
}

impl Views {
    pub fn for_version(version: PostgresVersion) -> Self {
        match version {
            PostgresVersion::Postgres9 => Self::postgres9(),
            PostgresVersion::Postgres13 => Self::postgres13(),
        }
    }

    /// Views for the process-wide version, applying the default if none was set.
    pub fn current() -> Self {
        Self::for_version(process_gate().get_or_default())
    }

    pub fn version(&self) -> PostgresVersion {
        self.version
    }

    /// `pg_blocking_pids(pid)`, joinable under `pg_stat_activity`.
    pub fn blocking_pids(&self) -> Queryable {
        Queryable::select_only(Target::BlockingPids)
    }

    fn postgres9() -> Self {
        use postgres9::*;
        Self {
            version: PostgresVersion::Postgres9,
            locks: Queryable::new(Target::Locks, &Lock),
            locks_on_tx_id: Queryable::new(Target::LocksOnTxId, &Lock),
            stat_activity: Queryable::new(Target::StatActivity, &StatActivity),
            stat_replication: Queryable::new(Target::StatReplication, &StatReplication),
            stat_ssl: Queryable::new(Target::StatSsl, &StatSsl),
            stat_gssapi: Queryable::unavailable(Target::Unspecified),
            stat_wal_receiver: Queryable::new(Target::StatWalReceiver, &StatWalReceiver),
            stat_subscription: Queryable::unavailable(Target::Unspecified),
            stat_database: Queryable::new(Target::StatDatabase, &StatDatabase),
            stat_database_conflicts: Queryable::new(
                Target::StatDatabaseConflicts,
                &StatDatabaseConflicts,
            ),
            stat_user_tables: Queryable::new(Target::StatUserTables, &StatTable),
            stat_user_indexes: Queryable::new(Target::StatUserIndexes, &StatIndex),
            statio_user_indexes: Queryable::new(Target::StatIoUserIndexes, &StatIoIndex),
            statio_user_sequences: Queryable::new(Target::StatIoUserSequences, &StatIoSequence),
            statio_user_tables: Queryable::new(Target::StatIoUserTables, &StatIoTable),
            stat_user_functions: Queryable::new(Target::StatUserFunctions, &StatUserFunction),
            stat_archiver: Queryable::new(Target::StatArchiver, &StatArchiver),
            stat_bgwriter: Queryable::new(Target::StatBgWriter, &StatBgWriter),
            stat_slru: Queryable::unavailable(Target::Unspecified),
        }
    }

    fn postgres13() -> Self {
        use postgres13::*;
        Self {
            version: PostgresVersion::Postgres13,
            locks: Queryable::new(Target::Locks, &Lock),
            locks_on_tx_id: Queryable::new(Target::LocksOnTxId, &Lock),
            stat_activity: Queryable::new(Target::StatActivity, &StatActivity),
            stat_replication: Queryable::new(Target::StatReplication, &StatReplication),
            stat_ssl: Queryable::new(Target::StatSsl, &StatSsl),
            stat_gssapi: Queryable::new(Target::StatGssapi, &StatGssapi),
            stat_wal_receiver: Queryable::new(Target::StatWalReceiver, &StatWalReceiver),
            stat_subscription: Queryable::new(Target::StatSubscription, &StatSubscription),
            stat_database: Queryable::new(Target::StatDatabase, &StatDatabase),
            stat_database_conflicts: Queryable::new(
                Target::StatDatabaseConflicts,
                &StatDatabaseConflicts,
            ),
            stat_user_tables: Queryable::new(Target::StatUserTables, &StatTable),
            stat_user_indexes: Queryable::new(Target::StatUserIndexes, &StatIndex),
            statio_user_indexes: Queryable::new(Target::StatIoUserIndexes, &StatIoIndex),
            statio_user_sequences: Queryable::new(Target::StatIoUserSequences, &StatIoSequence),
            statio_user_tables: Queryable::new(Target::StatIoUserTables, &StatIoTable),
            stat_user_functions: Queryable::new(Target::StatUserFunctions, &StatUserFunction),
            stat_archiver: Queryable::new(Target::StatArchiver, &StatArchiver),
            stat_bgwriter: Queryable::new(Target::StatBgWriter, &StatBgWriter),
            stat_slru: Queryable::new(Target::StatSlru, &StatSlru),
        }
    }

    /// Every view, in declaration order.
    pub fn all(&self) -> Vec<&Queryable> {
        vec![
            &self.locks,
            &self.locks_on_tx_id,
            &self.stat_activity,
            &self.stat_replication,
            &self.stat_ssl,
            &self.stat_gssapi,
            &self.stat_wal_receiver,
            &self.stat_subscription,
            &self.stat_database,
            &self.stat_database_conflicts,
            &self.stat_user_tables,
            &self.stat_user_indexes,
            &self.statio_user_indexes,
            &self.statio_user_sequences,
            &self.statio_user_tables,
            &self.stat_user_functions,
            &self.stat_archiver,
            &self.stat_bgwriter,
            &self.stat_slru,
        ]
    }
}
