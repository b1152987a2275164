//! Keyed document collections with snapshot persistence.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// A serde type stored in its own collection.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection (and snapshot file) name.
    const NAME: &'static str;

    /// Primary key of this document.
    fn key(&self) -> String;
}

/// A keyed collection of documents, optionally backed by a JSON snapshot
/// file. The write lock is held across the snapshot rewrite, so concurrent
/// single-document mutations serialize and each lands atomically.
pub struct Collection<T: Document> {
    path: Option<PathBuf>,
    docs: RwLock<BTreeMap<String, T>>,
}

impl<T: Document> Collection<T> {
    /// A collection with no backing file. Used by tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Open (or create) the collection backed by `<dir>/<NAME>.json`.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let path = dir.join(format!("{}.json", T::NAME));
        let mut docs = BTreeMap::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let loaded: Vec<T> = serde_json::from_str(&raw)?;
            for doc in loaded {
                docs.insert(doc.key(), doc);
            }
            debug!(collection = T::NAME, count = docs.len(), "Loaded collection");
        }

        Ok(Self {
            path: Some(path),
            docs: RwLock::new(docs),
        })
    }

    /// Insert a new document. Fails if the key is already present.
    pub async fn insert(&self, doc: T) -> StoreResult<T> {
        let mut docs = self.docs.write().await;
        let key = doc.key();
        if docs.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                collection: T::NAME,
                key,
            });
        }
        docs.insert(key, doc.clone());
        self.persist(&docs).await?;
        Ok(doc)
    }

    /// Insert a new document while enforcing a secondary unique index.
    ///
    /// `value_of` projects the indexed value; the check and the insert
    /// happen under one write lock, so two concurrent inserts cannot both
    /// claim the same value.
    pub async fn insert_unique<F>(&self, doc: T, index: &'static str, value_of: F) -> StoreResult<T>
    where
        F: Fn(&T) -> String,
    {
        let mut docs = self.docs.write().await;
        let key = doc.key();
        if docs.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                collection: T::NAME,
                key,
            });
        }
        let value = value_of(&doc);
        if docs.values().any(|existing| value_of(existing) == value) {
            return Err(StoreError::DuplicateIndex {
                collection: T::NAME,
                index,
                value,
            });
        }
        docs.insert(key, doc.clone());
        self.persist(&docs).await?;
        Ok(doc)
    }

    /// Replace the document under its key, inserting if absent.
    pub async fn put(&self, doc: T) -> StoreResult<T> {
        let mut docs = self.docs.write().await;
        docs.insert(doc.key(), doc.clone());
        self.persist(&docs).await?;
        Ok(doc)
    }

    /// Fetch a document by key.
    pub async fn get(&self, key: &str) -> Option<T> {
        self.docs.read().await.get(key).cloned()
    }

    /// Remove a document by key. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        let mut docs = self.docs.write().await;
        let existed = docs.remove(key).is_some();
        if existed {
            self.persist(&docs).await?;
        }
        Ok(existed)
    }

    /// All documents matching a predicate.
    pub async fn find<F>(&self, pred: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs
            .read()
            .await
            .values()
            .filter(|doc| pred(doc))
            .cloned()
            .collect()
    }

    /// First document matching a predicate.
    pub async fn find_one<F>(&self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs.read().await.values().find(|doc| pred(doc)).cloned()
    }

    /// Every document in the collection.
    pub async fn all(&self) -> Vec<T> {
        self.docs.read().await.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }

    /// Rewrite the snapshot via a temp file + rename so a crash mid-write
    /// leaves the previous snapshot intact.
    async fn persist(&self, docs: &BTreeMap<String, T>) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot: Vec<&T> = docs.values().collect();
        let raw = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &raw).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
