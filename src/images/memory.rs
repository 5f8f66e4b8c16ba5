use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ImageStore;

#[derive(Clone, Default)]
pub struct MemoryImageStore {
    images: Arc<RwLock<HashMap<Uuid, Vec<u8>>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, item_id: Uuid, bytes: Vec<u8>) -> io::Result<()> {
        self.images.write().await.insert(item_id, bytes);
        Ok(())
    }

    async fn get(&self, item_id: Uuid) -> io::Result<Option<Vec<u8>>> {
        Ok(self.images.read().await.get(&item_id).cloned())
    }

    async fn exists(&self, item_id: Uuid) -> io::Result<bool> {
        Ok(self.images.read().await.contains_key(&item_id))
    }
}
