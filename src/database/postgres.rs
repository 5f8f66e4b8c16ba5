use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Entity, Store, TableSchema};
use crate::filter::{Filter, SqlResult};
use crate::warehouse::models::{Container, Item, Location, PermissionRole, Storage};

/// Postgres-backed store; one table per entity kind
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create missing tables and indexes. Existing tables only gain the `seq`
    /// column if they lack it.
    pub async fn bootstrap(&self) -> Result<(), DatabaseError> {
        let schemas: [TableSchema; 5] = [
            Location::SCHEMA,
            Storage::SCHEMA,
            Container::SCHEMA,
            Item::SCHEMA,
            PermissionRole::SCHEMA,
        ];

        for schema in schemas.iter() {
            sqlx::query(&schema.create_table_sql()).execute(&self.pool).await?;
            sqlx::query(&schema.add_seq_sql()).execute(&self.pool).await?;
            for statement in schema.create_index_sql() {
                sqlx::query(&statement).execute(&self.pool).await?;
            }
            debug!("Ensured table: {}", schema.table);
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

/// Filtered select in insertion order, so "first match" agrees with the memory store
fn ordered_select<T: Entity>(filter: &Filter, limit_one: bool) -> Result<SqlResult, DatabaseError> {
    let mut sql = filter.to_sql(T::SCHEMA.table, T::SCHEMA.columns)?;
    sql.query.push_str(" ORDER BY \"seq\"");
    if limit_one {
        sql.query.push_str(" LIMIT 1");
    }
    Ok(sql)
}

#[async_trait]
impl Store for PgStore {
    async fn insert<T: Entity>(&self, entity: T) -> Result<T, DatabaseError> {
        let schema = T::SCHEMA;
        let row = serde_json::to_value(&entity).map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let columns = schema
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (2..=schema.columns.len() + 1)
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" (\"id\", {}) VALUES ($1, {}) RETURNING *",
            schema.table, columns, placeholders
        );

        let mut q = sqlx::query_as::<_, T>(&sql).bind(entity.id());
        for column in schema.columns.iter() {
            let value: Option<String> = row.get(*column).and_then(Value::as_str).map(str::to_string);
            q = q.bind(value);
        }

        match q.fetch_one(&self.pool).await {
            Ok(inserted) => Ok(inserted),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DatabaseError::UniqueViolation(schema.table.to_string()))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn find_one<T: Entity>(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        let sql_result = ordered_select::<T>(&filter, true)?;

        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = q.bind(p);
        }
        let row = q.fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn find_many<T: Entity>(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        let sql_result = ordered_select::<T>(&filter, false)?;

        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = q.bind(p);
        }
        let rows: Vec<T> = q.fetch(&self.pool).try_collect().await?;
        Ok(rows)
    }

    async fn get_by_id<T: Entity>(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", T::SCHEMA.table);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
