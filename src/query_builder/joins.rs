//! Registry of the target pairs that can be joined, and the SQL fragments for each.
//!
//! Pairs are ordered: `(from, to)` and `(to, from)` are independent entries with their
//! own alias and condition. Anything not listed here is an unsupported join.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::Target;
use crate::error::{QueryError, Result};

/// The fixed SQL fragments for one ordered target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSpec {
    /// Alias of the joined subquery, `LEFT JOIN (...) AS <alias>`.
    pub alias: &'static str,
    /// Name of the JSON array column the joined rows are aggregated into.
    pub column_alias: &'static str,
    /// Boolean join condition.
    pub condition: &'static str,
}

impl JoinSpec {
    /// `(CASE WHEN count(<alias>) = 0 THEN '[]' ELSE json_agg(<alias>) END) AS <column_alias>`
    ///
    /// An empty join yields `[]` rather than SQL NULL.
    pub fn select_expression(&self) -> String {
        format!(
            "(CASE WHEN count({alias}) = 0 THEN '[]' ELSE json_agg({alias}) END) AS {column}",
            alias = self.alias,
            column = self.column_alias,
        )
    }
}

/// A resolved join between a parent and a child target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinClause {
    /// The child becomes `LEFT JOIN (<subquery>) AS <alias> ON <condition>`.
    Subquery {
        select: String,
        alias: &'static str,
        condition: &'static str,
    },
    /// The child contributes only a select expression, never a subquery.
    SelectOnly { select: String },
}

impl JoinClause {
    pub fn select_expression(&self) -> &str {
        match self {
            JoinClause::Subquery { select, .. } | JoinClause::SelectOnly { select } => select,
        }
    }

    pub fn is_select_only(&self) -> bool {
        matches!(self, JoinClause::SelectOnly { .. })
    }
}

const BLOCKED_BY: &str = "pg_blocking_pids(pg_stat_activity.pid) AS blocked_by";

macro_rules! spec {
    ($alias:literal, $column_alias:literal, $condition:literal) => {
        JoinSpec {
            alias: $alias,
            column_alias: $column_alias,
            condition: $condition,
        }
    };
}

#[rustfmt::skip]
const JOIN_SPECS: &[(Target, Target, JoinSpec)] = {
    use Target::*;
    &[
        // pg_stat_activity
        (StatActivity, Locks, spec!("l", "locks", "l.pid = pg_stat_activity.pid")),
        (StatActivity, LocksOnTxId, spec!("txlock", "tx_locks", "txlock.transactionid = pg_stat_activity.backend_xid")),
        (StatActivity, StatSsl, spec!("ssl", "ssl_usages", "ssl.pid = pg_stat_activity.pid")),
        (StatActivity, StatGssapi, spec!("gssapi", "gssapi_usages", "gssapi.pid = pg_stat_activity.pid")),
        (StatActivity, StatWalReceiver, spec!("wal_receiver", "wal_receivers", "wal_receiver.pid = pg_stat_activity.pid")),
        (StatActivity, StatSubscription, spec!("subscription", "subscriptions", "subscription.pid = pg_stat_activity.pid")),
        (StatActivity, StatDatabase, spec!("sa_database", "databases", "sa_database.datid = pg_stat_activity.datid")),
        (StatActivity, StatDatabaseConflicts, spec!("database_conflict", "database_conflicts", "database_conflict.datid = pg_stat_activity.datid")),

        // pg_stat_replication
        (StatReplication, Locks, spec!("l", "locks", "l.pid = pg_stat_replication.pid")),
        (StatReplication, StatSsl, spec!("ssl", "ssl_usages", "ssl.pid = pg_stat_replication.pid")),
        (StatReplication, StatGssapi, spec!("gssapi", "gssapi_usages", "gssapi.pid = pg_stat_replication.pid")),
        (StatReplication, StatWalReceiver, spec!("wal_receiver", "wal_receivers", "wal_receiver.pid = pg_stat_replication.pid")),

        // pg_stat_user_tables
        (StatUserTables, Locks, spec!("l", "locks", "l.relation = pg_stat_user_tables.relid")),
        (StatUserTables, StatUserIndexes, spec!("userindex", "indexes", "userindex.relid = pg_stat_user_tables.relid")),
        (StatUserTables, StatSubscription, spec!("subscr", "subscriptions", "subscr.relid = pg_stat_user_tables.relid")),
        (StatUserTables, StatIoUserIndexes, spec!("userindex_io", "index_iostats", "userindex_io.relid = pg_stat_user_tables.relid")),
        (StatUserTables, StatIoUserSequences, spec!("usersequence_io", "sequence_iostats", "usersequence_io.relid = pg_stat_user_tables.relid")),
        (StatUserTables, StatIoUserTables, spec!("usertable_io", "table_iostats", "usertable_io.relid = pg_stat_user_tables.relid")),

        // pg_locks
        (Locks, StatActivity, spec!("locks_sa", "activities", "locks_sa.pid = pg_locks.pid")),
        (Locks, StatDatabase, spec!("locks_database", "databases", "locks_database.datid = pg_locks.database")),
        (Locks, StatUserTables, spec!("locks_table", "tables", "locks_table.relid = pg_locks.relation")),
        (Locks, StatUserIndexes, spec!("locks_index", "indexes", "locks_index.relid = pg_locks.relation")),
        (Locks, StatIoUserTables, spec!("locks_table_io", "tables_io", "locks_table_io.relid = pg_locks.relation")),
        (Locks, StatIoUserIndexes, spec!("locks_index_io", "indexes_io", "locks_index_io.relid = pg_locks.relation")),
        (Locks, StatIoUserSequences, spec!("locks_sequence_io", "sequences_io", "locks_sequence_io.relid = pg_locks.relation")),

        // pg_stat_ssl
        (StatSsl, Locks, spec!("ssl_locks", "locks", "ssl_locks.pid = pg_stat_ssl.pid")),
        (StatSsl, StatActivity, spec!("ssl_activities", "activities", "ssl_activities.pid = pg_stat_ssl.pid")),

        // pg_stat_gssapi
        (StatGssapi, Locks, spec!("gssapi_locks", "locks", "gssapi_locks.pid = pg_stat_gssapi.pid")),
        (StatGssapi, StatActivity, spec!("gssapi_activities", "activities", "gssapi_activities.pid = pg_stat_gssapi.pid")),

        // pg_stat_wal_receiver
        (StatWalReceiver, Locks, spec!("walreceiver_locks", "locks", "walreceiver_locks.pid = pg_stat_wal_receiver.pid")),
        (StatWalReceiver, StatActivity, spec!("walreceiver_activities", "activities", "walreceiver_activities.pid = pg_stat_wal_receiver.pid")),

        // pg_stat_database
        (StatDatabase, StatDatabaseConflicts, spec!("statdb_dbconflicts", "conflicts", "statdb_dbconflicts.datid = pg_stat_database.datid")),
        (StatDatabase, Locks, spec!("statdb_locks", "locks", "statdb_locks.database = pg_stat_database.datid")),
        (StatDatabase, StatActivity, spec!("statdb_activities", "activities", "statdb_activities.datid = pg_stat_database.datid")),

        // pg_stat_subscription
        (StatSubscription, Locks, spec!("subscription_locks", "locks", "subscription_locks.pid = pg_stat_subscription.pid")),
        (StatSubscription, StatActivity, spec!("subscription_activities", "activities", "subscription_activities.pid = pg_stat_subscription.pid")),

        // pg_stat_user_indexes
        (StatUserIndexes, StatUserTables, spec!("statindex_tables", "tables", "statindex_tables.relid = pg_stat_user_indexes.relid")),
        (StatUserIndexes, StatIoUserTables, spec!("statindex_tablesio", "tablesio", "statindex_tablesio.relid = pg_stat_user_indexes.relid")),
        (StatUserIndexes, Locks, spec!("statindex_locks", "locks", "statindex_locks.relation = pg_stat_user_indexes.indexrelid")),
        (StatUserIndexes, StatIoUserIndexes, spec!("statindex_indexesio", "indexesio", "statindex_indexesio.indexrelid = pg_stat_user_indexes.indexrelid")),
    ]
};

fn registry() -> &'static HashMap<(Target, Target), JoinSpec> {
    static REGISTRY: OnceLock<HashMap<(Target, Target), JoinSpec>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        JOIN_SPECS
            .iter()
            .map(|(from, to, spec)| ((*from, *to), *spec))
            .collect()
    })
}

/// Look up the join spec for an ordered pair, if one is registered.
///
/// The `pg_stat_activity` / `pg_blocking_pids` pair is not a relation join and has no spec.
pub fn join_spec(from: Target, to: Target) -> Option<&'static JoinSpec> {
    registry().get(&(from, to))
}

/// Every registered ordered pair.
pub fn supported_pairs() -> impl Iterator<Item = (Target, Target)> {
    JOIN_SPECS.iter().map(|(from, to, _)| (*from, *to))
}

/// Resolve how `to` joins under `from`.
pub fn join_clause(from: Target, to: Target) -> Result<JoinClause> {
    if (from, to) == (Target::StatActivity, Target::BlockingPids) {
        return Ok(JoinClause::SelectOnly {
            select: BLOCKED_BY.to_string(),
        });
    }

    join_spec(from, to)
        .map(|spec| JoinClause::Subquery {
            select: spec.select_expression(),
            alias: spec.alias,
            condition: spec.condition,
        })
        .ok_or(QueryError::UnsupportedJoin { from, to })
}

/// A `LEFT JOIN` against a parenthesised subquery.
#[derive(Debug, Clone)]
pub struct Join {
    pub subquery: String,
    pub alias: String,
    pub on_condition: String,
}

impl Join {
    pub fn left_subquery(subquery: String, alias: &str, on_condition: &str) -> Self {
        Self {
            subquery,
            alias: alias.to_string(),
            on_condition: on_condition.to_string(),
        }
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        format!(
            "LEFT JOIN ({}) AS {} ON {}",
            self.subquery, self.alias, self.on_condition
        )
    }
}
