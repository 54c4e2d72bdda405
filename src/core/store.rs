use crate::core::{Kind, Record, Storage};
use crate::utils::error::{Result, SiteError};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Where collections live relative to the storage root.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    pub data_dir: String,
    pub public_dir: String,
}

impl StoreLayout {
    pub fn new(data_dir: impl Into<String>, public_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            public_dir: public_dir.into(),
        }
    }

    pub fn collection_path(&self, kind: Kind) -> String {
        format!("{}/{}", self.data_dir, kind.collection_file())
    }

    pub fn public_path(&self, kind: Kind) -> String {
        format!("{}/data/{}", self.public_dir, kind.collection_file())
    }

    pub fn uploads_dir(&self) -> String {
        format!("{}/uploads", self.public_dir)
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new("data", "public")
    }
}

/// Append-only JSON collections, one file per kind.
///
/// Every append is a read-modify-write of the whole file, so appends to the
/// same kind are serialized through that kind's lock. Different kinds do
/// not contend.
pub struct SubmissionStore<S: Storage> {
    storage: S,
    layout: StoreLayout,
    locks: HashMap<Kind, Mutex<()>>,
}

impl<S: Storage> SubmissionStore<S> {
    pub fn new(storage: S, layout: StoreLayout) -> Self {
        let locks = Kind::ALL.into_iter().map(|k| (k, Mutex::new(()))).collect();
        Self {
            storage,
            layout,
            locks,
        }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn lock(&self, kind: Kind) -> &Mutex<()> {
        // 所有 Kind 在建構時都已建立鎖
        &self.locks[&kind]
    }

    /// Appends a record with a server-assigned timestamp and returns it.
    pub async fn append(&self, kind: Kind, fields: Map<String, Value>) -> Result<Record> {
        let _guard = self.lock(kind).lock().await;

        let mut records = self.read_collection(kind).await?;

        let now = Utc::now();
        let id = kind.has_id().then(|| now.timestamp_millis().to_string());
        let record = Record::new(id, fields, now);
        records.push(record.clone());

        let data = serde_json::to_vec_pretty(&records)?;
        let path = self.layout.collection_path(kind);
        self.storage
            .write_file(&path, &data)
            .await
            .map_err(|e| SiteError::StoreWriteError {
                kind,
                message: e.to_string(),
            })?;

        tracing::debug!("Appended {} record ({} total) to {}", kind, records.len(), path);
        Ok(record)
    }

    /// Full collection in insertion order; empty when the file is absent.
    pub async fn list_all(&self, kind: Kind) -> Result<Vec<Record>> {
        self.read_collection(kind).await
    }

    /// Records whose `category` equals `category` exactly, in insertion order.
    pub async fn list_by_category(&self, kind: Kind, category: &str) -> Result<Vec<Record>> {
        let records = self.read_collection(kind).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.category() == Some(category))
            .collect())
    }

    /// Copies the authoritative collection to its public path.
    ///
    /// Returns `false` when there is nothing to publish yet.
    pub async fn publish(&self, kind: Kind) -> Result<bool> {
        if !kind.is_publishable() {
            return Err(SiteError::NotPublishable { kind });
        }

        let _guard = self.lock(kind).lock().await;

        let source = self.layout.collection_path(kind);
        let Some(data) = self.storage.read_file(&source).await? else {
            tracing::debug!("Nothing to publish for {}: {} does not exist", kind, source);
            return Ok(false);
        };

        let destination = self.layout.public_path(kind);
        self.storage
            .write_file(&destination, &data)
            .await
            .map_err(|e| SiteError::StoreWriteError {
                kind,
                message: format!("publish to {destination} failed: {e}"),
            })?;

        tracing::info!("✔ {} synced to {}", source, destination);
        Ok(true)
    }

    async fn read_collection(&self, kind: Kind) -> Result<Vec<Record>> {
        let path = self.layout.collection_path(kind);
        let Some(data) = self.storage.read_file(&path).await? else {
            return Ok(Vec::new());
        };

        // 空檔案視為空集合
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&data).map_err(|e| SiteError::StoreCorruptError {
            kind,
            message: format!("{path}: {e}"),
        })
    }
}
