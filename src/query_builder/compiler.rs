//! Lowers a [`Queryable`] tree into one nested SQL statement.
//!
//! Each true join becomes `LEFT JOIN (<child statement>) AS <alias> ON <condition>` and an
//! aggregated JSON array column on the parent; select-only children add a column and
//! nothing else. Whenever a node has at least one true join, its base columns are grouped
//! so each joined child collapses into its array.

use std::collections::HashSet;

use tracing::debug;

use super::builder::QueryBuilder;
use super::joins::{join_clause, Join, JoinClause};
use super::Queryable;
use crate::error::{QueryError, Result};

/// Compile `root` into SQL text.
///
/// Fails with [`QueryError::MutualRecursion`] before lowering anything if two nodes
/// anywhere in the tree share a signature, including unrelated siblings.
pub fn compile(root: &Queryable) -> Result<String> {
    if mutual_recursion_detected(root) {
        return Err(QueryError::MutualRecursion);
    }

    let sql = lower(root)?;
    debug!(root = %root.target(), sql = %sql, "compiled queryable");
    Ok(sql)
}

impl Queryable {
    /// Convert this tree to a SQL query. See [`compile`].
    pub fn to_sql(&self) -> Result<String> {
        compile(self)
    }
}

/// Whether any signature repeats across the whole tree.
pub fn mutual_recursion_detected(root: &Queryable) -> bool {
    let mut seen = HashSet::new();
    search_for_same_queryable(root, &mut seen)
}

fn search_for_same_queryable(node: &Queryable, seen: &mut HashSet<String>) -> bool {
    if !seen.insert(node.signature()) {
        return true;
    }
    node.joins()
        .iter()
        .any(|join| search_for_same_queryable(join, seen))
}

fn unsupported_target(node: &Queryable) -> QueryError {
    QueryError::UnsupportedTarget {
        queryable: node.to_string(),
    }
}

fn lower(node: &Queryable) -> Result<String> {
    if !node.is_valid() {
        return Err(unsupported_target(node));
    }

    let base_selects = node
        .specifier()
        .map(|specifier| specifier.selects())
        .unwrap_or_default();
    let mut builder = QueryBuilder::new(node.target().name()).select(base_selects.clone());

    for child in node.joins() {
        let wrap = |source: QueryError| QueryError::JoinFailed {
            parent: node.target(),
            child: child.target(),
            source: Box::new(source),
        };

        if !child.is_valid() {
            return Err(wrap(unsupported_target(child)));
        }

        let clause = join_clause(node.target(), child.target()).map_err(wrap)?;
        builder = builder.add_select(clause.select_expression());

        if let JoinClause::Subquery {
            alias, condition, ..
        } = clause
        {
            if !child.is_select_only() {
                let subquery = lower(child).map_err(wrap)?;
                builder = builder.join(Join::left_subquery(subquery, alias, condition));
            }
        }
    }

    if builder.has_joins() {
        builder = builder.group_by(&base_selects);
    }
    if let Some(filter) = node.filter() {
        builder = builder.where_raw(filter);
    }

    Ok(builder.build_sql())
}
