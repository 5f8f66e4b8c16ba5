use crate::database::Store;
use crate::filter::Filter;
use crate::types::EntityKind;
use crate::warehouse::error::{WarehouseError, WarehouseResult};
use crate::warehouse::models::{Container, Item, Location, Storage};

/// Borrowed reference to any entity that belongs to a location
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'e> {
    Location(&'e Location),
    Storage(&'e Storage),
    Container(&'e Container),
    Item(&'e Item),
}

/// Walks parent codes upward to the owning location.
///
/// Only the store is consulted; a dangling parent code is reported as
/// `NotFound` for the missing parent's kind, never as a permission failure.
pub struct HierarchyNavigator<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> HierarchyNavigator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn location_of(&self, entity: EntityRef<'_>) -> WarehouseResult<String> {
        match entity {
            EntityRef::Location(location) => Ok(location.code.clone()),
            EntityRef::Storage(storage) => Ok(storage.location_code.clone()),
            EntityRef::Container(container) => {
                let storage = self.storage_of(container).await?;
                Ok(storage.location_code)
            }
            EntityRef::Item(item) => {
                let container = self.container_of(item).await?;
                let storage = self.storage_of(&container).await?;
                Ok(storage.location_code)
            }
        }
    }

    pub async fn location_by_code(&self, code: &str) -> WarehouseResult<Location> {
        self.store
            .find_one(Filter::new().eq("code", code))
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Location))
    }

    /// Owning storage of a container, matched on storage code alone
    pub async fn storage_of(&self, container: &Container) -> WarehouseResult<Storage> {
        self.store
            .find_one(Filter::new().eq("code", container.storage_code.as_str()))
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Storage))
    }

    /// Owning container of an item, matched on container code alone
    pub async fn container_of(&self, item: &Item) -> WarehouseResult<Container> {
        self.store
            .find_one(Filter::new().eq("code", item.container_code.as_str()))
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Container))
    }
}
