use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::store::{Entity, TableSchema};
use crate::types::EntityKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Location {
    pub fn new(code: impl Into<String>, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            description,
        }
    }
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Location;
    const SCHEMA: TableSchema = TableSchema {
        table: "locations",
        columns: &["code", "name", "description"],
        optional: &["description"],
        indexed: &[],
        unique: &["code"],
    };

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Storage {
    pub id: Uuid,
    pub location_code: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Storage {
    pub fn new(
        location_code: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            location_code: location_code.into(),
            code: code.into(),
            name: name.into(),
            description,
        }
    }
}

impl Entity for Storage {
    const KIND: EntityKind = EntityKind::Storage;
    const SCHEMA: TableSchema = TableSchema {
        table: "storages",
        columns: &["location_code", "code", "name", "description"],
        optional: &["description"],
        indexed: &["location_code", "code"],
        unique: &["location_code", "code"],
    };

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Container {
    pub id: Uuid,
    pub storage_code: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Container {
    pub fn new(
        storage_code: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            storage_code: storage_code.into(),
            code: code.into(),
            name: name.into(),
            description,
        }
    }
}

impl Entity for Container {
    const KIND: EntityKind = EntityKind::Container;
    const SCHEMA: TableSchema = TableSchema {
        table: "containers",
        columns: &["storage_code", "code", "name", "description"],
        optional: &["description"],
        indexed: &["storage_code", "code"],
        unique: &["storage_code", "name"],
    };

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub container_code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Item {
    pub fn new(container_code: impl Into<String>, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            container_code: container_code.into(),
            name: name.into(),
            description,
        }
    }
}

impl Entity for Item {
    const KIND: EntityKind = EntityKind::Item;
    const SCHEMA: TableSchema = TableSchema {
        table: "items",
        columns: &["container_code", "name", "description"],
        optional: &["description"],
        indexed: &["container_code"],
        unique: &[],
    };

    fn id(&self) -> Uuid {
        self.id
    }
}

/// One user's role at one location. The role is kept as text; see `Role::from_str`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PermissionRole {
    pub id: Uuid,
    pub user_id: String,
    pub location_code: String,
    pub role: String,
}

impl PermissionRole {
    pub fn new(user_id: impl Into<String>, location_code: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            location_code: location_code.into(),
            role: role.into(),
        }
    }
}

impl Entity for PermissionRole {
    const KIND: EntityKind = EntityKind::Role;
    // No unique key: duplicate (user, location) rows are tolerated, first match wins
    const SCHEMA: TableSchema = TableSchema {
        table: "roles",
        columns: &["user_id", "location_code", "role"],
        optional: &[],
        indexed: &["user_id", "location_code"],
        unique: &[],
    };

    fn id(&self) -> Uuid {
        self.id
    }
}

// Request payloads

#[derive(Debug, Clone, Deserialize)]
pub struct NewLocation {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStorage {
    pub location_code: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContainer {
    pub storage_code: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub container_code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// Read projections

/// Storage nested under its location: no id, no back-reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageSummary {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<Storage> for StorageSummary {
    fn from(storage: Storage) -> Self {
        Self {
            code: storage.code,
            name: storage.name,
            description: storage.description,
        }
    }
}

/// Container nested under its storage: no id, no back-reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSummary {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<Container> for ContainerSummary {
    fn from(container: Container) -> Self {
        Self {
            code: container.code,
            name: container.name,
            description: container.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDetail {
    #[serde(flatten)]
    pub location: Location,
    pub storages: Vec<StorageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageDetail {
    #[serde(flatten)]
    pub storage: Storage,
    pub containers: Vec<ContainerSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub has_picture: bool,
}

// Export tree

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationExport {
    pub location: Location,
    pub storages: Vec<StorageExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageExport {
    pub storage: Storage,
    pub containers: Vec<ContainerExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerExport {
    pub container: Container,
    pub items: Vec<Item>,
}
