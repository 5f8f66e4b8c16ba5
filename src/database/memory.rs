use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{Entity, Store};
use crate::filter::Filter;

type Row = Map<String, Value>;

/// In-process store keeping rows as JSON objects, in insertion order.
///
/// Unique keys declared by each entity's schema are enforced under the write
/// lock, so check-then-insert is atomic here (unlike the application-level
/// uniqueness check in the service).
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<&'static str, Vec<Row>>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `DatabaseError::Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), DatabaseError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn to_row<T: Entity>(entity: &T) -> Result<Row, DatabaseError> {
        match serde_json::to_value(entity) {
            Ok(Value::Object(row)) => Ok(row),
            Ok(_) => Err(DatabaseError::QueryError(format!(
                "{} rows must serialize to objects",
                T::SCHEMA.table
            ))),
            Err(e) => Err(DatabaseError::QueryError(e.to_string())),
        }
    }

    fn from_row<T: Entity>(row: &Row) -> Result<T, DatabaseError> {
        serde_json::from_value(Value::Object(row.clone()))
            .map_err(|e| DatabaseError::QueryError(e.to_string()))
    }

    fn same_key(unique: &[&str], a: &Row, b: &Row) -> bool {
        !unique.is_empty() && unique.iter().all(|c| a.get(*c) == b.get(*c))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert<T: Entity>(&self, entity: T) -> Result<T, DatabaseError> {
        self.ensure_online()?;
        let schema = T::SCHEMA;
        let row = Self::to_row(&entity)?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(schema.table).or_default();

        let id = row.get("id");
        if rows.iter().any(|existing| existing.get("id") == id) {
            return Err(DatabaseError::UniqueViolation(format!("{}.id", schema.table)));
        }
        if rows.iter().any(|existing| Self::same_key(schema.unique, existing, &row)) {
            return Err(DatabaseError::UniqueViolation(schema.table.to_string()));
        }

        rows.push(row);
        Ok(entity)
    }

    async fn find_one<T: Entity>(&self, filter: Filter) -> Result<Option<T>, DatabaseError> {
        self.ensure_online()?;
        filter.validate(T::SCHEMA.table, T::SCHEMA.columns)?;

        let tables = self.tables.read().await;
        let found = tables
            .get(T::SCHEMA.table)
            .and_then(|rows| rows.iter().find(|row| filter.matches(row)));

        found.map(Self::from_row).transpose()
    }

    async fn find_many<T: Entity>(&self, filter: Filter) -> Result<Vec<T>, DatabaseError> {
        self.ensure_online()?;
        filter.validate(T::SCHEMA.table, T::SCHEMA.columns)?;

        let tables = self.tables.read().await;
        let Some(rows) = tables.get(T::SCHEMA.table) else {
            return Ok(vec![]);
        };

        rows.iter()
            .filter(|row| filter.matches(row))
            .map(Self::from_row)
            .collect()
    }

    async fn get_by_id<T: Entity>(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        self.ensure_online()?;
        let id = Value::String(id.to_string());

        let tables = self.tables.read().await;
        let found = tables
            .get(T::SCHEMA.table)
            .and_then(|rows| rows.iter().find(|row| row.get("id") == Some(&id)));

        found.map(Self::from_row).transpose()
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.ensure_online()
    }
}
