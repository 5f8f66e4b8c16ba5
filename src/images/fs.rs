use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use super::ImageStore;

/// Pictures stored as `<root>/<item id>.jpg`
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, item_id: Uuid) -> PathBuf {
        self.root.join(format!("{}.jpg", item_id))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn put(&self, item_id: Uuid, bytes: Vec<u8>) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        // Write beside the target and rename so readers never see a partial file
        let target = self.path_for(item_id);
        let staging = self.root.join(format!("{}.jpg.{}.tmp", item_id, Uuid::new_v4().simple()));
        tokio::fs::write(&staging, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        debug!("Stored picture {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }

    async fn get(&self, item_id: Uuid) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(item_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn exists(&self, item_id: Uuid) -> io::Result<bool> {
        match tokio::fs::metadata(self.path_for(item_id)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
