use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 固定的商品/商家分類清單
pub const CATEGORIES: [&str; 10] = [
    "Agriculture",
    "Technology",
    "Fashion",
    "Food & Beverages",
    "Health",
    "Education",
    "Construction",
    "Entertainment",
    "Transportation",
    "Tourism",
];

/// The seven form/entity kinds, each backed by its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Contact,
    Forum,
    Marketplace,
    Membership,
    School,
    Tour,
    Product,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::Contact,
        Kind::Forum,
        Kind::Marketplace,
        Kind::Membership,
        Kind::School,
        Kind::Tour,
        Kind::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Contact => "Contact",
            Kind::Forum => "Forum",
            Kind::Marketplace => "Marketplace",
            Kind::Membership => "Membership",
            Kind::School => "School",
            Kind::Tour => "Tour",
            Kind::Product => "Product",
        }
    }

    /// File name of the collection inside the data directory.
    ///
    /// Marketplace keeps the legacy `submissions.json` name because the
    /// business listing endpoint has always read from it.
    pub fn collection_file(&self) -> &'static str {
        match self {
            Kind::Contact => "contacts.json",
            Kind::Forum => "forums.json",
            Kind::Marketplace => "submissions.json",
            Kind::Membership => "memberships.json",
            Kind::School => "schools.json",
            Kind::Tour => "tours.json",
            Kind::Product => "products.json",
        }
    }

    /// Only the product catalog has a public copy.
    pub fn is_publishable(&self) -> bool {
        matches!(self, Kind::Product)
    }

    /// Kinds whose records carry a store-assigned `id`.
    pub fn has_id(&self) -> bool {
        matches!(self, Kind::Product)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted submission.
///
/// `fields` holds the kind-specific canonical fields; `id` and
/// `submittedAt` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,

    // 舊資料可能使用 createdAt 或完全沒有時間戳
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new(id: Option<String>, fields: Map<String, Value>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            fields,
            submitted_at: Some(submitted_at),
        }
    }

    /// String value of a field, `None` when absent, null or empty.
    pub fn field_str(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.fields.get("category").and_then(Value::as_str)
    }
}
