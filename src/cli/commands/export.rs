use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::auth::Identity;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::images::FsImageStore;
use crate::warehouse::WarehouseService;

/// Run the export operation directly against the configured store.
/// Permissions still apply: `user_id` needs a role at the location.
pub async fn handle(config: AppConfig, location: &str, user_id: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let backend = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open store")?;
    let images = Arc::new(FsImageStore::new(&config.images.directory));
    let service = WarehouseService::new(backend, images);

    let identity = Identity::new(user_id, user_id);
    let result = service.export_location(&identity, location).await;
    service.store().close().await;

    let export = result.with_context(|| format!("export of {} failed", location))?;
    let body = serde_json::to_string_pretty(&export)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, body)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote export of {} to {}", location, path.display());
        }
        None => println!("{}", body),
    }
    Ok(())
}
