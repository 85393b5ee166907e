// src/db/mod.rs

pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;

use crate::{config::Config, error::AppError, utils::row::Row};

pub use postgres::PgSqlClient;

/// Comments of one title with the author's profile joined in, oldest first.
/// `$1` is the manga id.
pub const MANGA_COMMENTS_SQL: &str = r#"
    SELECT
        c.*,
        p.username   AS _profile_username,
        p.avatar_url AS _profile_avatar
    FROM public.manga_comments AS c
    LEFT JOIN public.profiles AS p ON p.id = c.user_id
    WHERE c.manga_id = $1
    ORDER BY c.created_at ASC
"#;

/// Executes parameterized read queries.
///
/// The returned value may use any of the layouts understood by
/// [`rows_from_result`].
#[async_trait]
pub trait SqlClient: Send + Sync {
    async fn query(&self, sql: &str, binds: &[i64]) -> Result<Value, AppError>;
}

/// Handle used by handlers to run queries and get plain rows back.
#[derive(Clone)]
pub struct Sql {
    client: Arc<dyn SqlClient>,
}

impl Sql {
    pub fn new(client: Arc<dyn SqlClient>) -> Self {
        Self { client }
    }

    /// Builds the Postgres-backed handle, or `Ok(None)` when no database is configured.
    ///
    /// The pool connects lazily: an unreachable server shows up as a query
    /// error on the first request rather than at startup.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let Some(database_url) = config.database_url.as_deref() else {
            return Ok(None);
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
            .connect_lazy(database_url)?;

        Ok(Some(Self::new(Arc::new(PgSqlClient::new(pool)))))
    }

    /// Runs `sql` and normalizes the result to a list of rows.
    pub async fn rows(&self, sql: &str, binds: &[i64]) -> Result<Vec<Row>, AppError> {
        let result = self.client.query(sql, binds).await?;
        Ok(rows_from_result(result))
    }
}

/// Result layouts produced by the database clients we know about.
enum ResultShape {
    /// `[row, ...]`
    Bare(Vec<Value>),
    /// `{ "rows": [row, ...] }`
    Rows(Vec<Value>),
    /// `{ "results": [{ "rows": [row, ...] }, ...] }`
    Nested(Vec<Value>),
    Unrecognized,
}

impl ResultShape {
    fn detect(result: Value) -> Self {
        let mut object = match result {
            Value::Array(rows) => return ResultShape::Bare(rows),
            Value::Object(object) => object,
            _ => return ResultShape::Unrecognized,
        };

        if let Some(Value::Array(rows)) = object.remove("rows") {
            return ResultShape::Rows(rows);
        }

        let first_result = match object.remove("results") {
            Some(Value::Array(results)) => results.into_iter().next(),
            _ => None,
        };
        match first_result {
            Some(Value::Object(mut first)) => match first.remove("rows") {
                Some(Value::Array(rows)) => ResultShape::Nested(rows),
                _ => ResultShape::Unrecognized,
            },
            _ => ResultShape::Unrecognized,
        }
    }

    fn into_rows(self) -> Vec<Row> {
        let rows = match self {
            ResultShape::Bare(rows) | ResultShape::Rows(rows) | ResultShape::Nested(rows) => rows,
            ResultShape::Unrecognized => return Vec::new(),
        };

        rows.into_iter()
            .filter_map(|row| match row {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect()
    }
}

/// Flattens any recognized result layout into an ordered list of rows.
/// Unrecognized layouts yield no rows.
pub fn rows_from_result(result: Value) -> Vec<Row> {
    ResultShape::detect(result).into_rows()
}
