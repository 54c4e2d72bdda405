//! Wires configuration, storage, notifier and HTTP server together.

use crate::adapters::{LocalStorage, LogNotifier, RelayNotifier};
use crate::config::SiteConfig;
use crate::core::notify::NotificationDispatcher;
use crate::core::store::SubmissionStore;
use crate::core::submission::SubmissionService;
use crate::core::{Kind, Notifier};
use crate::server;
use crate::utils::error::Result;
use std::future::Future;
use std::sync::Arc;

/// Picks the relay notifier when an endpoint is configured, otherwise logs.
pub fn build_notifier(config: &SiteConfig) -> Result<Arc<dyn Notifier>> {
    let identity = config.identity();
    match &config.mail.relay_endpoint {
        Some(endpoint) => {
            tracing::info!("📧 Sending mail through relay {}", endpoint);
            Ok(Arc::new(RelayNotifier::new(
                endpoint.clone(),
                config.mail.relay_token.clone(),
                identity,
            )?))
        }
        None => {
            tracing::warn!("No mail relay configured; notifications will only be logged");
            Ok(Arc::new(LogNotifier::new(identity)))
        }
    }
}

/// Prepares the storage root and returns the submission service.
pub async fn build_service(
    config: &SiteConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<Arc<SubmissionService<LocalStorage>>> {
    let layout = config.layout();
    let storage = LocalStorage::new(&config.storage.root);

    // 確保必要的資料夾存在
    storage
        .ensure_dirs(&[
            layout.data_dir.clone(),
            layout.public_dir.clone(),
            format!("{}/data", layout.public_dir),
            layout.uploads_dir(),
        ])
        .await?;

    let store = Arc::new(SubmissionStore::new(storage, layout));

    // 啟動時同步一次公開的產品清單
    store.publish(Kind::Product).await?;

    let dispatcher = NotificationDispatcher::new(notifier, config.recipients());
    Ok(Arc::new(SubmissionService::new(store, dispatcher)))
}

pub async fn run<F>(config: SiteConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.socket_addr()?;
    let notifier = build_notifier(&config)?;
    let service = build_service(&config, notifier).await?;

    tracing::info!(
        "📁 Data in {}/{}, public files in {}",
        config.storage.root.display(),
        config.storage.data_dir,
        config.public_root().display()
    );

    server::serve(
        addr,
        service,
        config.public_root(),
        config.server.max_body_bytes,
        shutdown,
    )
    .await
}
