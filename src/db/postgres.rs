// src/db/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::{
    Column, PgPool, Row as _, TypeInfo, ValueRef,
    postgres::PgRow,
    types::Uuid,
};

use super::SqlClient;
use crate::error::AppError;

/// `SqlClient` backed by a sqlx Postgres pool.
///
/// Rows are returned as a bare JSON array, one object per row keyed by column name.
pub struct PgSqlClient {
    pool: PgPool,
}

impl PgSqlClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SqlClient for PgSqlClient {
    async fn query(&self, sql: &str, binds: &[i64]) -> Result<Value, AppError> {
        let mut query = sqlx::query(sql);
        for bind in binds {
            query = query.bind(*bind);
        }

        let rows = query.fetch_all(&self.pool).await?;

        Ok(Value::Array(rows.iter().map(row_to_json).collect()))
    }
}

fn row_to_json(row: &PgRow) -> Value {
    let mut object = Map::new();
    for column in row.columns() {
        let value = column_to_json(row, column.ordinal(), column.type_info().name());
        object.insert(column.name().to_string(), value);
    }
    Value::Object(object)
}

/// Decodes one column by its Postgres type. Unsupported types become null.
fn column_to_json(row: &PgRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if !raw.is_null() => {}
        _ => return Value::Null,
    }

    let decoded = match type_name.to_ascii_uppercase().as_str() {
        "BOOL" => row.try_get::<bool, _>(index).map(Value::from),
        "INT2" => row.try_get::<i16, _>(index).map(Value::from),
        "INT4" => row.try_get::<i32, _>(index).map(Value::from),
        "INT8" => row.try_get::<i64, _>(index).map(Value::from),
        "FLOAT4" => row.try_get::<f32, _>(index).map(|f| Value::from(f64::from(f))),
        "FLOAT8" => row.try_get::<f64, _>(index).map(Value::from),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
            row.try_get::<String, _>(index).map(Value::from)
        }
        "UUID" => row
            .try_get::<Uuid, _>(index)
            .map(|id| Value::from(id.to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|ts| Value::from(ts.to_rfc3339_opts(SecondsFormat::Millis, true))),
        "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|ts| Value::from(ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())),
        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .map(|d| Value::from(d.to_string())),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index),
        other => {
            tracing::debug!(column = index, column_type = other, "Unsupported column type, returning null");
            return Value::Null;
        }
    };

    decoded.unwrap_or_else(|e| {
        tracing::debug!(column = index, column_type = type_name, "Column decode failed: {}", e);
        Value::Null
    })
}
