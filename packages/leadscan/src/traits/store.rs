//! Generic JSON-valued key-value persistence.
//!
//! The core treats the storage backend as an external collaborator
//! with plain get/set semantics: no transactions, no compare-and-swap.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Persisted key names, shared with any display or export collaborator
/// reading the same store.
pub mod keys {
    pub const LEADS: &str = "leads";
    pub const PAGES_SCANNED: &str = "pagesScanned";
    pub const SCANNED_URLS: &str = "scannedUrls";
    pub const SCRAPING_ENABLED: &str = "isScrapingEnabled";
}

/// Key-value persistence with JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the requested keys. Keys with no stored value are absent
    /// from the returned mapping.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Store every entry in the mapping.
    async fn set(&self, entries: HashMap<String, Value>) -> Result<()>;

    /// Read one key and decode it into a typed value.
    async fn get_value<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        let mut mapping = self.get(&[key]).await?;
        match mapping.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Encode and store one typed value.
    async fn set_value<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.set(entries).await
    }
}

// Shared store handles work anywhere a store is expected
#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        (**self).get(keys).await
    }

    async fn set(&self, entries: HashMap<String, Value>) -> Result<()> {
        (**self).set(entries).await
    }
}
