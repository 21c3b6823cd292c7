use super::Join;

/// Assembles a single `SELECT` statement.
///
/// Clauses are emitted as `SELECT <fields> FROM <table> <joins> WHERE <filter> GROUP BY
/// <fields>`, each part only when present. Nothing is reordered or deduplicated.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_table: String,
    select_fields: Vec<String>,
    joins: Vec<Join>,
    where_clause: Option<String>,
    group_by: Vec<String>,
}

impl QueryBuilder {
    /// Create a new query builder for the given table
    pub fn new(table: &str) -> Self {
        Self {
            base_table: table.to_string(),
            select_fields: Vec::new(),
            joins: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
        }
    }

    /// Set the fields to select
    pub fn select(mut self, fields: Vec<String>) -> Self {
        self.select_fields = fields;
        self
    }

    /// Append one select expression
    pub fn add_select(mut self, expression: &str) -> Self {
        self.select_fields.push(expression.to_string());
        self
    }

    /// Add a JOIN clause
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Set a raw WHERE fragment
    pub fn where_raw(mut self, fragment: &str) -> Self {
        self.where_clause = Some(fragment.to_string());
        self
    }

    /// Add GROUP BY fields
    pub fn group_by(mut self, fields: &[String]) -> Self {
        self.group_by.extend(fields.iter().cloned());
        self
    }

    pub fn has_joins(&self) -> bool {
        !self.joins.is_empty()
    }

    /// Build the complete SQL query string
    pub fn build_sql(&self) -> String {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_fields.join(", "),
            self.base_table
        );

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }

        if let Some(ref fragment) = self.where_clause {
            sql.push_str(&format!(" WHERE {fragment}"));
        }

        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_query_building() {
        let sql = QueryBuilder::new("pg_locks")
            .select(vec!["pg_locks.pid".to_string(), "pg_locks.mode".to_string()])
            .build_sql();

        assert_eq!(sql, "SELECT pg_locks.pid, pg_locks.mode FROM pg_locks");
    }

    #[test]
    fn test_clause_order() {
        let base = vec!["pg_stat_activity.pid".to_string()];
        let sql = QueryBuilder::new("pg_stat_activity")
            .select(base.clone())
            .add_select("json_agg(l) AS locks")
            .join(Join::left_subquery(
                "SELECT pg_locks.pid FROM pg_locks".to_string(),
                "l",
                "l.pid = pg_stat_activity.pid",
            ))
            .where_raw("pg_stat_activity.state = 'active'")
            .group_by(&base)
            .build_sql();

        assert_eq!(
            sql,
            "SELECT pg_stat_activity.pid, json_agg(l) AS locks FROM pg_stat_activity \
             LEFT JOIN (SELECT pg_locks.pid FROM pg_locks) AS l ON l.pid = pg_stat_activity.pid \
             WHERE pg_stat_activity.state = 'active' \
             GROUP BY pg_stat_activity.pid"
        );
    }
}
