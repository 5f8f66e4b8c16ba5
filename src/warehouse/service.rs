use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Identity;
use crate::database::{DatabaseError, Entity, Store};
use crate::filter::Filter;
use crate::images::ImageStore;
use crate::types::EntityKind;
use crate::warehouse::code::validate_code;
use crate::warehouse::error::{WarehouseError, WarehouseResult};
use crate::warehouse::models::{
    Container, ContainerExport, ContainerSummary, Item, ItemView, Location, LocationDetail,
    LocationExport, NewContainer, NewItem, NewLocation, NewStorage, Storage, StorageDetail,
    StorageExport, StorageSummary,
};
use crate::warehouse::navigator::{EntityRef, HierarchyNavigator};
use crate::warehouse::permission::{Action, PermissionResolver, Role};

/// Access-controlled warehouse operations.
///
/// Every operation follows the same order: validate input, find the target
/// (or its parent), resolve the owning location, check the caller's role,
/// then check uniqueness and write or read. A missing entity is therefore
/// always reported before a permission failure.
pub struct WarehouseService<S> {
    store: S,
    images: Arc<dyn ImageStore>,
}

impl<S: Store> WarehouseService<S> {
    pub fn new(store: S, images: Arc<dyn ImageStore>) -> Self {
        Self { store, images }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn permissions(&self) -> PermissionResolver<'_, S> {
        PermissionResolver::new(&self.store)
    }

    fn navigator(&self) -> HierarchyNavigator<'_, S> {
        HierarchyNavigator::new(&self.store)
    }

    /// Insert, reporting a unique-key collision from the store as `AlreadyExists`
    async fn insert_new<T: Entity>(&self, entity: T) -> WarehouseResult<T> {
        match self.store.insert(entity).await {
            Ok(inserted) => Ok(inserted),
            Err(DatabaseError::UniqueViolation(_)) => Err(WarehouseError::AlreadyExists(T::KIND)),
            Err(e) => Err(e.into()),
        }
    }

    async fn storage_in(&self, location: &Location, code: &str) -> WarehouseResult<Storage> {
        self.store
            .find_one(
                Filter::new()
                    .eq("code", code)
                    .eq("location_code", location.code.as_str()),
            )
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Storage))
    }

    /// Storage codes repeat across locations, so a container is only "in" the
    /// storage when its own chain resolves back to the storage's location.
    async fn container_in(&self, storage: &Storage, code: &str) -> WarehouseResult<Container> {
        let candidates: Vec<Container> = self
            .store
            .find_many(
                Filter::new()
                    .eq("code", code)
                    .eq("storage_code", storage.code.as_str()),
            )
            .await?;

        for container in candidates {
            if self.belongs_to(EntityRef::Container(&container), &storage.location_code).await? {
                return Ok(container);
            }
        }
        Err(WarehouseError::NotFound(EntityKind::Container))
    }

    async fn belongs_to(&self, entity: EntityRef<'_>, location_code: &str) -> WarehouseResult<bool> {
        Ok(self.navigator().location_of(entity).await? == location_code)
    }

    /// Containers filed under `storage` whose owning location is the storage's
    async fn containers_of(&self, storage: &Storage) -> WarehouseResult<Vec<Container>> {
        let containers: Vec<Container> = self
            .store
            .find_many(Filter::new().eq("storage_code", storage.code.as_str()))
            .await?;

        let mut owned = Vec::with_capacity(containers.len());
        for container in containers {
            if self.belongs_to(EntityRef::Container(&container), &storage.location_code).await? {
                owned.push(container);
            }
        }
        Ok(owned)
    }

    /// Items filed under `container` whose owning location is `location_code`
    async fn items_of(&self, container: &Container, location_code: &str) -> WarehouseResult<Vec<Item>> {
        let items: Vec<Item> = self
            .store
            .find_many(Filter::new().eq("container_code", container.code.as_str()))
            .await?;

        let mut owned = Vec::with_capacity(items.len());
        for item in items {
            if self.belongs_to(EntityRef::Item(&item), location_code).await? {
                owned.push(item);
            }
        }
        Ok(owned)
    }

    async fn item_view(&self, item: Item) -> WarehouseResult<ItemView> {
        let has_picture = self.images.exists(item.id).await?;
        Ok(ItemView { item, has_picture })
    }

    /// Load an item and authorize `action` at its owning location
    async fn authorized_item(&self, identity: &Identity, id: Uuid, action: Action) -> WarehouseResult<Item> {
        let item: Item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Item))?;

        let location_code = self.navigator().location_of(EntityRef::Item(&item)).await?;
        self.permissions().authorize(identity, &location_code, action).await?;
        Ok(item)
    }

    // Locations

    /// Anyone may create a location; the creator becomes its admin.
    ///
    /// The location row and the admin role row are two separate writes. If the
    /// role write fails the location stays and the error is returned.
    pub async fn create_location(&self, identity: &Identity, payload: NewLocation) -> WarehouseResult<Location> {
        let code = validate_code(&payload.code).ok_or(WarehouseError::InvalidCode(EntityKind::Location))?;

        let existing: Option<Location> = self.store.find_one(Filter::new().eq("code", code.as_str())).await?;
        if existing.is_some() {
            return Err(WarehouseError::AlreadyExists(EntityKind::Location));
        }

        let location = self
            .insert_new(Location::new(code, payload.name, payload.description))
            .await?;
        self.permissions()
            .grant(&identity.user_id, &location.code, Role::Admin)
            .await?;

        info!("Created location {} for {} ({})", location.code, identity.username, identity.user_id);
        Ok(location)
    }

    pub async fn get_location(&self, identity: &Identity, code: &str) -> WarehouseResult<LocationDetail> {
        let location = self.navigator().location_by_code(code).await?;
        self.permissions()
            .authorize(identity, &location.code, Action::ViewLocation)
            .await?;

        let storages: Vec<Storage> = self
            .store
            .find_many(Filter::new().eq("location_code", location.code.as_str()))
            .await?;

        Ok(LocationDetail {
            location,
            storages: storages.into_iter().map(StorageSummary::from).collect(),
        })
    }

    /// Full subtree of a location in one response, unpaginated
    pub async fn export_location(&self, identity: &Identity, code: &str) -> WarehouseResult<LocationExport> {
        let location = self.navigator().location_by_code(code).await?;
        self.permissions()
            .authorize(identity, &location.code, Action::ExportLocation)
            .await?;

        let storages: Vec<Storage> = self
            .store
            .find_many(Filter::new().eq("location_code", location.code.as_str()))
            .await?;

        let mut storage_exports = Vec::with_capacity(storages.len());
        for storage in storages {
            let containers = self.containers_of(&storage).await?;

            let mut container_exports = Vec::with_capacity(containers.len());
            for container in containers {
                let items = self.items_of(&container, &location.code).await?;
                container_exports.push(ContainerExport { container, items });
            }

            storage_exports.push(StorageExport {
                storage,
                containers: container_exports,
            });
        }

        debug!("Exported location {} ({} storages)", location.code, storage_exports.len());
        Ok(LocationExport {
            location,
            storages: storage_exports,
        })
    }

    // Storages

    pub async fn create_storage(&self, identity: &Identity, payload: NewStorage) -> WarehouseResult<Storage> {
        let code = validate_code(&payload.code).ok_or(WarehouseError::InvalidCode(EntityKind::Storage))?;

        let location = self.navigator().location_by_code(&payload.location_code).await?;
        let location_code = self.navigator().location_of(EntityRef::Location(&location)).await?;
        self.permissions()
            .authorize(identity, &location_code, Action::CreateStorage)
            .await?;

        let existing: Option<Storage> = self
            .store
            .find_one(
                Filter::new()
                    .eq("code", code.as_str())
                    .eq("location_code", location_code.as_str()),
            )
            .await?;
        if existing.is_some() {
            return Err(WarehouseError::AlreadyExists(EntityKind::Storage));
        }

        let storage = self
            .insert_new(Storage::new(location_code, code, payload.name, payload.description))
            .await?;
        info!("Created storage {} in {} by {}", storage.code, storage.location_code, identity.username);
        Ok(storage)
    }

    pub async fn get_storage(&self, identity: &Identity, location_code: &str, code: &str) -> WarehouseResult<StorageDetail> {
        let location = self.navigator().location_by_code(location_code).await?;
        let storage = self.storage_in(&location, code).await?;
        self.permissions()
            .authorize(identity, &location.code, Action::ViewStorage)
            .await?;

        let containers = self.containers_of(&storage).await?;

        Ok(StorageDetail {
            storage,
            containers: containers.into_iter().map(ContainerSummary::from).collect(),
        })
    }

    // Containers

    pub async fn create_container(&self, identity: &Identity, payload: NewContainer) -> WarehouseResult<Container> {
        let code = validate_code(&payload.code).ok_or(WarehouseError::InvalidCode(EntityKind::Container))?;

        let storage: Storage = self
            .store
            .find_one(Filter::new().eq("code", payload.storage_code.as_str()))
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Storage))?;
        let location_code = self.navigator().location_of(EntityRef::Storage(&storage)).await?;
        self.permissions()
            .authorize(identity, &location_code, Action::CreateContainer)
            .await?;

        let existing: Option<Container> = self
            .store
            .find_one(
                Filter::new()
                    .eq("name", payload.name.as_str())
                    .eq("storage_code", storage.code.as_str()),
            )
            .await?;
        if existing.is_some() {
            return Err(WarehouseError::AlreadyExists(EntityKind::Container));
        }

        let container = self
            .insert_new(Container::new(storage.code, code, payload.name, payload.description))
            .await?;
        info!("Created container {} in {} by {}", container.code, container.storage_code, identity.username);
        Ok(container)
    }

    pub async fn get_container(
        &self,
        identity: &Identity,
        location_code: &str,
        storage_code: &str,
        code: &str,
    ) -> WarehouseResult<Container> {
        let location = self.navigator().location_by_code(location_code).await?;
        let storage = self.storage_in(&location, storage_code).await?;
        let container = self.container_in(&storage, code).await?;
        self.permissions()
            .authorize(identity, &location.code, Action::ViewContainer)
            .await?;
        Ok(container)
    }

    /// Every item in a container, each with its picture flag
    pub async fn list_items(
        &self,
        identity: &Identity,
        location_code: &str,
        storage_code: &str,
        container_code: &str,
    ) -> WarehouseResult<Vec<ItemView>> {
        let container = self
            .get_container(identity, location_code, storage_code, container_code)
            .await?;
        let items = self.items_of(&container, location_code).await?;

        let mut views = Vec::with_capacity(items.len());
        for item in items {
            views.push(self.item_view(item).await?);
        }
        Ok(views)
    }

    // Items

    pub async fn create_item(&self, identity: &Identity, payload: NewItem) -> WarehouseResult<Item> {
        let container: Container = self
            .store
            .find_one(Filter::new().eq("code", payload.container_code.as_str()))
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Container))?;
        let location_code = self.navigator().location_of(EntityRef::Container(&container)).await?;
        self.permissions()
            .authorize(identity, &location_code, Action::CreateItem)
            .await?;

        let item = self
            .insert_new(Item::new(container.code, payload.name, payload.description))
            .await?;
        info!("Created item {} in {} by {}", item.id, item.container_code, identity.username);
        Ok(item)
    }

    pub async fn get_item(&self, identity: &Identity, id: Uuid) -> WarehouseResult<ItemView> {
        let item = self.authorized_item(identity, id, Action::ViewItem).await?;
        self.item_view(item).await
    }

    pub async fn get_item_picture(&self, identity: &Identity, id: Uuid) -> WarehouseResult<Vec<u8>> {
        let item = self.authorized_item(identity, id, Action::ViewItemPicture).await?;
        self.images
            .get(item.id)
            .await?
            .ok_or(WarehouseError::NotFound(EntityKind::Image))
    }

    /// Replace the item's picture. No payload is accepted and leaves any
    /// existing picture in place.
    pub async fn set_item_picture(
        &self,
        identity: &Identity,
        id: Uuid,
        picture: Option<Vec<u8>>,
    ) -> WarehouseResult<ItemView> {
        let item = self.authorized_item(identity, id, Action::SetItemPicture).await?;
        if let Some(bytes) = picture {
            let size = bytes.len();
            self.images.put(item.id, bytes).await?;
            info!("Set picture for item {} ({} bytes) by {}", item.id, size, identity.username);
        }
        self.item_view(item).await
    }
}
