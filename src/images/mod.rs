pub mod fs;
pub mod memory;

use async_trait::async_trait;
use std::io;
use uuid::Uuid;

pub use fs::FsImageStore;
pub use memory::MemoryImageStore;

/// Binary storage for item pictures, keyed by item id.
///
/// Writes overwrite unconditionally; concurrent writers to the same item are
/// last-write-wins.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, item_id: Uuid, bytes: Vec<u8>) -> io::Result<()>;

    async fn get(&self, item_id: Uuid) -> io::Result<Option<Vec<u8>>>;

    async fn exists(&self, item_id: Uuid) -> io::Result<bool>;
}
