//! Query Compiler Integration Tests
//!
//! Whole-tree compilation through the public API, across every registered join pair and
//! both server generations.

mod common;

use common::view_for;
use pgstat_query::query_builder::{join_spec, supported_pairs};
use pgstat_query::{compile, PostgresVersion, QueryError, Queryable, Target, Views};

#[test]
fn every_supported_pair_compiles_on_13() {
    let views = Views::for_version(PostgresVersion::Postgres13);

    for (from, to) in supported_pairs() {
        let parent = view_for(&views, from).expect("every 13 target has a view");
        let child = view_for(&views, to).expect("every 13 target has a view");

        let sql = compile(&parent.with_child(child))
            .unwrap_or_else(|e| panic!("{from} -> {to} should compile: {e}"));

        if to == Target::BlockingPids {
            assert!(!sql.contains("LEFT JOIN"));
        } else {
            let spec = join_spec(from, to).unwrap();
            assert!(sql.contains(&format!(") AS {} ON {}", spec.alias, spec.condition)));
            assert!(sql.contains(&format!("AS {}", spec.column_alias)));
            assert!(sql.contains(" GROUP BY "));
        }
    }
}

#[test]
fn postgres9_pairs_fail_only_on_missing_views() {
    let views = Views::for_version(PostgresVersion::Postgres9);
    let missing = [Target::StatGssapi, Target::StatSubscription, Target::StatSlru];

    for (from, to) in supported_pairs() {
        let (Some(parent), Some(child)) = (view_for(&views, from), view_for(&views, to)) else {
            assert!(missing.contains(&from) || missing.contains(&to));
            continue;
        };
        assert!(
            compile(&parent.with_child(child)).is_ok(),
            "{from} -> {to} should compile on 9.6"
        );
    }
}

#[test]
fn activity_with_locks_matches_expected_shape() {
    let views = Views::for_version(PostgresVersion::Postgres13);
    let sql = views
        .stat_activity
        .with_child(views.locks.clone())
        .to_sql()
        .unwrap();

    let from_at = sql.find(" FROM pg_stat_activity ").unwrap();
    let join_at = sql
        .find("LEFT JOIN (SELECT pg_locks.locktype, pg_locks.database")
        .unwrap();
    let on_at = sql.find(") AS l ON l.pid = pg_stat_activity.pid").unwrap();
    let group_at = sql.find(" GROUP BY pg_stat_activity.datid").unwrap();

    assert!(sql.starts_with("SELECT pg_stat_activity.datid, "));
    assert!(sql.contains(", (CASE WHEN count(l) = 0 THEN '[]' ELSE json_agg(l) END) AS locks FROM"));
    assert!(from_at < join_at && join_at < on_at && on_at < group_at);
}

#[test]
fn subscription_under_activity_is_unsupported_on_9() {
    let views = Views::for_version(PostgresVersion::Postgres9);
    let err = views
        .stat_activity
        .with_child(views.stat_subscription.clone())
        .to_sql()
        .unwrap_err();

    assert!(matches!(err, QueryError::JoinFailed { .. }));
    assert!(matches!(err.root_cause(), QueryError::UnsupportedTarget { .. }));
}

#[test]
fn unsupported_pair_names_both_relations() {
    let views = Views::for_version(PostgresVersion::Postgres13);
    let err = views
        .stat_archiver
        .with_child(views.locks.clone())
        .to_sql()
        .unwrap_err();

    assert!(matches!(
        err.root_cause(),
        QueryError::UnsupportedJoin {
            from: Target::StatArchiver,
            to: Target::Locks
        }
    ));
    let message = err.to_string();
    assert!(message.contains("pg_stat_archiver"));
    assert!(message.contains("pg_locks"));
}

#[test]
fn repeated_subtree_is_rejected_before_lowering() {
    let views = Views::for_version(PostgresVersion::Postgres13);
    let tables = views.stat_user_tables.with_child(views.locks.clone());
    // The unsupported pair below would fail too, but the signature check runs first
    let tree = views
        .stat_user_indexes
        .with_children([tables.clone(), tables, views.stat_archiver.clone()]);

    assert!(matches!(compile(&tree), Err(QueryError::MutualRecursion)));
}

#[test]
fn shared_prefix_compiles_independently() {
    let views = Views::for_version(PostgresVersion::Postgres13);
    let prefix = views.stat_activity.with_child(views.locks.clone());
    let before = prefix.to_sql().unwrap();

    let with_ssl = prefix.with_child(views.stat_ssl.clone());
    let with_blockers = prefix.with_child(views.blocking_pids());

    assert_eq!(prefix.to_sql().unwrap(), before);
    assert!(with_ssl.to_sql().unwrap().contains("AS ssl"));
    assert!(!with_ssl.to_sql().unwrap().contains("blocked_by"));
    assert!(with_blockers.to_sql().unwrap().contains("AS blocked_by"));
    assert!(!with_blockers.to_sql().unwrap().contains("AS ssl"));
}

#[test]
fn filter_on_select_only_child_is_ignored() {
    let views = Views::for_version(PostgresVersion::Postgres13);
    let blockers = Queryable::select_only(Target::BlockingPids).with_filter("1 = 0");
    let sql = views.stat_activity.with_child(blockers).to_sql().unwrap();

    assert!(!sql.contains("1 = 0"));
}

#[test]
fn both_lock_joins_under_activity_compile() {
    let views = Views::for_version(PostgresVersion::Postgres13);
    let tree = views
        .stat_activity
        .with_children([views.locks.clone(), views.locks_on_tx_id.clone()]);

    let sql = compile(&tree).unwrap();
    assert!(sql.contains(") AS l ON l.pid = pg_stat_activity.pid"));
    assert!(sql.contains(") AS txlock ON txlock.transactionid = pg_stat_activity.backend_xid"));
    assert!(sql.contains("AS tx_locks"));
}
