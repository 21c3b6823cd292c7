//! Column lists for PostgreSQL 9.6.

use super::specifiers;

specifiers! { "postgres9";
    /// A row in `pg_locks`.
    Lock => "pg_locks" [
        "locktype", "database", "relation", "page", "tuple", "virtualxid", "transactionid",
        "classid", "objid", "objsubid", "virtualtransaction", "pid", "mode", "granted", "fastpath",
    ]

    /// A row in `pg_stat_activity`.
    StatActivity => "pg_stat_activity" [
        "datid", "datname", "pid", "usesysid", "usename", "application_name", "client_addr",
        "client_hostname", "client_port", "backend_start", "xact_start", "query_start",
        "state_change", "wait_event_type", "wait_event", "state", "backend_xid", "backend_xmin",
        "query",
    ]

    /// A row in `pg_stat_replication`.
    StatReplication => "pg_stat_replication" [
        "pid", "usesysid", "usename", "application_name", "client_addr", "client_hostname",
        "client_port", "backend_start", "backend_xmin", "state", "sent_location",
        "write_location", "flush_location", "replay_location", "sync_priority", "sync_state",
    ]

    StatSsl => "pg_stat_ssl" [
        "pid", "ssl", "version", "cipher", "bits", "compression", "clientdn",
    ]

    StatWalReceiver => "pg_stat_wal_receiver" [
        "pid", "status", "receive_start_lsn", "receive_start_tli", "received_lsn",
        "received_tli", "last_msg_send_time", "last_msg_receipt_time", "latest_end_lsn",
        "latest_end_time", "slot_name", "conninfo",
    ]

    StatDatabase => "pg_stat_database" [
        "datid", "datname", "numbackends", "xact_commit", "xact_rollback", "blks_read",
        "blks_hit", "tup_returned", "tup_fetched", "tup_inserted", "tup_updated", "tup_deleted",
        "conflicts", "temp_files", "temp_bytes", "deadlocks", "blk_read_time", "blk_write_time",
        "stats_reset",
    ]

    StatDatabaseConflicts => "pg_stat_database_conflicts" [
        "datid", "datname", "confl_tablespace", "confl_lock", "confl_snapshot",
        "confl_bufferpin", "confl_deadlock",
    ]

    /// A row in `pg_stat_user_tables`.
    StatTable => "pg_stat_user_tables" [
        "relid", "schemaname", "relname", "seq_scan", "seq_tup_read", "idx_scan",
        "idx_tup_fetch", "n_tup_ins", "n_tup_upd", "n_tup_del", "n_tup_hot_upd", "n_live_tup",
        "n_dead_tup", "n_mod_since_analyze", "vacuum_count", "last_vacuum", "autovacuum_count",
        "last_autovacuum", "analyze_count", "last_analyze", "autoanalyze_count",
        "last_autoanalyze",
    ]

    StatIndex => "pg_stat_user_indexes" [
        "relid", "indexrelid", "schemaname", "relname", "indexrelname", "idx_scan",
        "idx_tup_read", "idx_tup_fetch",
    ]

    StatIoIndex => "pg_statio_user_indexes" [
        "relid", "indexrelid", "schemaname", "relname", "indexrelname", "idx_blks_read",
        "idx_blks_hit",
    ]

    StatIoSequence => "pg_statio_user_sequences" [
        "relid", "schemaname", "relname", "blks_read", "blks_hit",
    ]

    StatIoTable => "pg_statio_user_tables" [
        "relid", "schemaname", "relname", "heap_blks_read", "heap_blks_hit", "idx_blks_read",
        "idx_blks_hit", "toast_blks_read", "toast_blks_hit", "tidx_blks_read", "tidx_blks_hit",
    ]

    StatUserFunction => "pg_stat_user_functions" [
        "funcid", "schemaname", "funcname", "calls", "total_time", "self_time",
    ]

    StatArchiver => "pg_stat_archiver" [
        "archived_count", "last_archived_wal", "last_archived_time", "failed_count",
        "last_failed_wal", "last_failed_time", "stats_reset",
    ]

    StatBgWriter => "pg_stat_bgwriter" [
        "checkpoints_timed", "checkpoints_req", "checkpoint_write_time", "checkpoint_sync_time",
        "buffers_checkpoint", "buffers_clean", "maxwritten_clean", "buffers_backend",
        "buffers_backend_fsync", "buffers_alloc", "stats_reset",
    ]
}
