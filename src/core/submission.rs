use crate::core::notify::{DispatchReport, NotificationDispatcher};
use crate::core::store::SubmissionStore;
use crate::core::{Kind, Record, Storage};
use crate::domain::forms::{parse_submission, FormFields};
use crate::utils::error::{Result, SiteError};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// A file received with a submission (product image).
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

impl Upload {
    /// Browsers send an empty part when no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn extension(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let ext = Path::new(name).extension()?.to_str()?;
        let valid = !ext.is_empty()
            && ext.len() <= 8
            && ext.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then(|| ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct Accepted {
    pub record: Record,
    pub notifications: DispatchReport,
}

/// validate → store → publish → notify, for every form kind.
pub struct SubmissionService<S: Storage> {
    store: Arc<SubmissionStore<S>>,
    dispatcher: NotificationDispatcher,
}

impl<S: Storage> SubmissionService<S> {
    pub fn new(store: Arc<SubmissionStore<S>>, dispatcher: NotificationDispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &SubmissionStore<S> {
        &self.store
    }

    pub async fn submit(
        &self,
        kind: Kind,
        input: &FormFields,
        upload: Option<Upload>,
    ) -> Result<Accepted> {
        // 驗證失敗時不寫入任何東西 (包含上傳檔案)
        let mut fields = parse_submission(kind, input)?;

        let mut saved_upload = None;
        if kind == Kind::Product {
            if let Some(upload) = upload.filter(|u| !u.is_empty()) {
                let (path, public_path) = self.save_upload(&upload).await?;
                fields.insert("image".to_string(), Value::String(public_path));
                saved_upload = Some(path);
            }
        }

        let record = match self.store.append(kind, fields).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("❌ Error saving {}: {}", kind, e);
                // 沒有紀錄指向的圖片不保留
                if let Some(path) = saved_upload {
                    self.discard_upload(&path).await;
                }
                return Err(e);
            }
        };
        tracing::info!("✅ {} submission stored", kind);

        if kind.is_publishable() {
            if let Err(e) = self.store.publish(kind).await {
                tracing::error!("Failed to publish {} collection: {}", kind, e);
            }
        }

        let notifications = self.dispatcher.dispatch(kind, &record).await;
        Ok(Accepted {
            record,
            notifications,
        })
    }

    /// Returns the storage path and the public URL path of the saved file.
    async fn save_upload(&self, upload: &Upload) -> Result<(String, String)> {
        let mut name = uuid::Uuid::new_v4().simple().to_string();
        if let Some(ext) = upload.extension() {
            name = format!("{name}.{ext}");
        }

        let path = format!("{}/{}", self.store.layout().uploads_dir(), name);
        self.store
            .storage()
            .write_file(&path, &upload.data)
            .await
            .map_err(|e| SiteError::StoreWriteError {
                kind: Kind::Product,
                message: format!("could not store upload {name}: {e}"),
            })?;

        tracing::debug!("Stored upload {} ({} bytes)", path, upload.data.len());
        Ok((path, format!("/uploads/{name}")))
    }

    async fn discard_upload(&self, path: &str) {
        match self.store.storage().remove_file(path).await {
            Ok(()) => tracing::debug!("Removed orphan upload {}", path),
            Err(e) => tracing::warn!("⚠️ Could not remove orphan upload {}: {}", path, e),
        }
    }
}
