use std::fmt;

use serde::{Deserialize, Serialize};

/// A single, non-recursive queryable target.
///
/// Usually a relation (a `pg_stat_*` view or `pg_locks`), but it can also be the
/// result of a function call such as `pg_blocking_pids`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Placeholder for a view that does not exist in the active version.
    /// Never a legal compile target.
    Unspecified,
    Locks,
    /// `pg_locks`, joined on the transaction id rather than the pid.
    LocksOnTxId,
    StatActivity,
    StatReplication,
    StatSsl,
    StatGssapi,
    StatWalReceiver,
    StatSubscription,
    StatDatabase,
    StatDatabaseConflicts,
    StatUserTables,
    StatUserIndexes,
    StatIoUserIndexes,
    StatIoUserSequences,
    StatIoUserTables,
    StatUserFunctions,
    StatArchiver,
    StatBgWriter,
    StatSlru,
    BlockingPids,
}

impl Target {
    /// Every target, in declaration order.
    pub const ALL: [Target; 21] = [
        Target::Unspecified,
        Target::Locks,
        Target::LocksOnTxId,
        Target::StatActivity,
        Target::StatReplication,
        Target::StatSsl,
        Target::StatGssapi,
        Target::StatWalReceiver,
        Target::StatSubscription,
        Target::StatDatabase,
        Target::StatDatabaseConflicts,
        Target::StatUserTables,
        Target::StatUserIndexes,
        Target::StatIoUserIndexes,
        Target::StatIoUserSequences,
        Target::StatIoUserTables,
        Target::StatUserFunctions,
        Target::StatArchiver,
        Target::StatBgWriter,
        Target::StatSlru,
        Target::BlockingPids,
    ];

    /// The relation or function name as it appears in SQL.
    pub fn name(&self) -> &'static str {
        match self {
            Target::Unspecified => "",
            Target::Locks | Target::LocksOnTxId => "pg_locks",
            Target::StatActivity => "pg_stat_activity",
            Target::StatReplication => "pg_stat_replication",
            Target::StatSsl => "pg_stat_ssl",
            Target::StatGssapi => "pg_stat_gssapi",
            Target::StatWalReceiver => "pg_stat_wal_receiver",
            Target::StatSubscription => "pg_stat_subscription",
            Target::StatDatabase => "pg_stat_database",
            Target::StatDatabaseConflicts => "pg_stat_database_conflicts",
            Target::StatUserTables => "pg_stat_user_tables",
            Target::StatUserIndexes => "pg_stat_user_indexes",
            Target::StatIoUserIndexes => "pg_statio_user_indexes",
            Target::StatIoUserSequences => "pg_statio_user_sequences",
            Target::StatIoUserTables => "pg_statio_user_tables",
            Target::StatUserFunctions => "pg_stat_user_functions",
            Target::StatArchiver => "pg_stat_archiver",
            Target::StatBgWriter => "pg_stat_bgwriter",
            Target::StatSlru => "pg_stat_slru",
            Target::BlockingPids => "pg_blocking_pids",
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Target::Unspecified)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unspecified_has_empty_name() {
        assert_eq!(Target::Unspecified.name(), "");
        assert!(Target::Unspecified.is_unspecified());
    }

    #[test]
    fn test_every_specified_target_has_a_name() {
        for target in Target::ALL.iter().filter(|t| !t.is_unspecified()) {
            assert!(!target.name().is_empty(), "{target:?} has no name");
        }
    }

    #[test]
    fn test_tx_id_locks_share_the_relation() {
        assert_eq!(Target::LocksOnTxId.name(), Target::Locks.name());
        assert_ne!(Target::LocksOnTxId, Target::Locks);
    }
}
