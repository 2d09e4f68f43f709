use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};

use crate::config;
use crate::database::manager::DatabaseError;
use crate::helpers::sql::SqlValue;

/// The capability models need from storage: run one statement with
/// positional binds and hand back its rows as JSON objects.
///
/// Statements may be `SELECT`s or data-modifying statements with a
/// `RETURNING` list; both produce rows keyed by output column name.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Value>, DatabaseError>;
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Value>, DatabaseError> {
        (**self).query(sql, params).await
    }
}

#[async_trait]
impl QueryExecutor for PgPool {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Value>, DatabaseError> {
        let settings = &config::config().database;
        if settings.enable_query_logging {
            tracing::debug!(sql = %sql, params = ?params, "executing query");
        }

        // Each row comes back as one JSON object, so column names and NUMERIC text survive.
        let wrapped = wrap_as_json_rows(sql);
        // Unprepared: bind types vary between calls of the same text (NULL vs a value).
        let mut q = sqlx::query(&wrapped).persistent(false);
        for p in params.iter() {
            q = bind_param(q, p);
        }

        let started = Instant::now();
        let rows = q.fetch_all(self).await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if settings.enable_slow_query_warning && elapsed_ms > settings.slow_query_threshold_ms {
            tracing::warn!(elapsed_ms, sql = %sql, "slow query");
        }

        rows.iter()
            .map(|row| row.try_get::<Value, _>("row").map_err(DatabaseError::from))
            .collect()
    }
}

/// The CTE is materialized, so rows are read back in the order the
/// statement produced them (an `ORDER BY` inside `sql` is kept).
fn wrap_as_json_rows(sql: &str) -> String {
    format!("WITH t AS MATERIALIZED ({}) SELECT row_to_json(t) AS row FROM t", sql)
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q SqlValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        // int4 has an assignment cast to every column type these tables use
        SqlValue::Null => q.bind(None::<i32>),
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Float(f) => q.bind(*f),
        SqlValue::Text(s) => q.bind(s.as_str()),
        SqlValue::Decimal(d) => q.bind(*d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_statement_as_materialized_json_rows() {
        let sql = wrap_as_json_rows("DELETE FROM jobs WHERE id = $1 RETURNING id");
        assert_eq!(
            sql,
            "WITH t AS MATERIALIZED (DELETE FROM jobs WHERE id = $1 RETURNING id) \
             SELECT row_to_json(t) AS row FROM t"
        );
    }

    #[test]
    fn ordering_stays_inside_the_statement() {
        let sql = wrap_as_json_rows("SELECT id FROM jobs ORDER BY title");
        assert!(sql.contains("(SELECT id FROM jobs ORDER BY title)"));
        assert!(!sql.contains("json_agg"));
    }
}
