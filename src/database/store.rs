use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::filter::Filter;
use crate::types::EntityKind;

/// Static table layout for a stored entity.
///
/// Every entity has a UUID `id` primary key plus the text columns listed here.
/// Tables also carry a `seq` insertion counter that reads are ordered by.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub table: &'static str,
    /// Text columns besides `id`, in insert order
    pub columns: &'static [&'static str],
    /// Columns allowed to be NULL
    pub optional: &'static [&'static str],
    /// Columns used in equality lookups
    pub indexed: &'static [&'static str],
    /// Columns that together must be unique (empty = no constraint)
    pub unique: &'static [&'static str],
}

impl TableSchema {
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                if self.optional.contains(c) {
                    format!("\"{}\" TEXT", c)
                } else {
                    format!("\"{}\" TEXT NOT NULL", c)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\"id\" UUID PRIMARY KEY, \"seq\" BIGSERIAL, {})",
            self.table, columns
        )
    }

    /// Backfill `seq` on tables created before it existed
    pub fn add_seq_sql(&self) -> String {
        format!(
            "ALTER TABLE \"{}\" ADD COLUMN IF NOT EXISTS \"seq\" BIGSERIAL",
            self.table
        )
    }

    pub fn create_index_sql(&self) -> Vec<String> {
        let mut statements: Vec<String> = self
            .indexed
            .iter()
            .map(|c| {
                format!(
                    "CREATE INDEX IF NOT EXISTS \"{table}_{col}_idx\" ON \"{table}\" (\"{col}\")",
                    table = self.table,
                    col = c
                )
            })
            .collect();

        if !self.unique.is_empty() {
            let quoted = self
                .unique
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ");
            statements.push(format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"{table}_{name}_key\" ON \"{table}\" ({cols})",
                table = self.table,
                name = self.unique.join("_"),
                cols = quoted
            ));
        }

        statements
    }
}

/// A row type the store knows how to persist and query
pub trait Entity:
    Serialize + DeserializeOwned + for<'r> FromRow<'r, PgRow> + Clone + Send + Sync + Unpin + 'static
{
    const KIND: EntityKind;
    const SCHEMA: TableSchema;

    fn id(&self) -> Uuid;
}

/// Persistence for warehouse entities.
///
/// `None` and empty results mean "not found" and are never errors; a
/// `DatabaseError` always means the store itself failed.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new row; fails with `UniqueViolation` if the entity's unique key is taken
    async fn insert<T: Entity>(&self, entity: T) -> Result<T, DatabaseError>;

    async fn find_one<T: Entity>(&self, filter: Filter) -> Result<Option<T>, DatabaseError>;

    async fn find_many<T: Entity>(&self, filter: Filter) -> Result<Vec<T>, DatabaseError>;

    async fn get_by_id<T: Entity>(&self, id: Uuid) -> Result<Option<T>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Store client selected at startup
#[derive(Clone)]
pub enum Backend {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres(_) => "postgres",
            Backend::Memory(_) => "memory",
        }
    }

    /// Release connections; the backend must not be used afterwards
    pub async fn close(&self) {
        match self {
            Backend::Postgres(store) => store.close().await,
            Backend::Memory(_) => {}
        }
    }
}

#[async_trait]
impl Store for Backend {
    async fn insert<T: Entity>(&self, entity: T) -> Result<T, DatabaseError> {
        match self {
            Backend::Postgres(store) => store.insert(entity).await,
            Backend::Memory(store) => store.insert(entity).await,
        }
    }

    async fn find_one<T: Entity>(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        match self {
            Backend::Postgres(store) => store.find_one(filter).await,
            Backend::Memory(store) => store.find_one(filter).await,
        }
    }

    async fn find_many<T: Entity>(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        match self {
            Backend::Postgres(store) => store.find_many(filter).await,
            Backend::Memory(store) => store.find_many(filter).await,
        }
    }

    async fn get_by_id<T: Entity>(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        match self {
            Backend::Postgres(store) => store.get_by_id(id).await,
            Backend::Memory(store) => store.get_by_id(id).await,
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        match self {
            Backend::Postgres(store) => store.health_check().await,
            Backend::Memory(store) => store.health_check().await,
        }
    }
}
