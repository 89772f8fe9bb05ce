//! Entity record storage.
//!
//! The pipeline reads and writes records through the [`EntityStore`] trait so
//! commit and export logic stays independent of where records live. The
//! in-memory implementation keys records by natural key per resource type,
//! which also gives exports a stable iteration order.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use sis_common::types::ResourceType;
use tokio::sync::RwLock;

/// A single entity record as a flat field map.
pub type Record = BTreeMap<String, String>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum EntityStoreError {
    /// The store rejected this one record. The row fails; the commit
    /// continues.
    #[error("{0}")]
    Rejected(String),
    /// The store itself is gone. The whole job fails.
    #[error("entity store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch one record by natural key.
    async fn get(
        &self,
        resource: ResourceType,
        key: &str,
    ) -> Result<Option<Record>, EntityStoreError>;

    /// All natural keys currently stored for a resource type.
    async fn keys(&self, resource: ResourceType) -> Result<HashSet<String>, EntityStoreError>;

    /// Insert a new record. Rejects if the key already exists.
    async fn insert(
        &self,
        resource: ResourceType,
        key: &str,
        record: Record,
    ) -> Result<(), EntityStoreError>;

    /// Replace an existing record. Rejects if the key does not exist.
    async fn update(
        &self,
        resource: ResourceType,
        key: &str,
        record: Record,
    ) -> Result<(), EntityStoreError>;

    /// Records matching every filter as a field equality, in natural key
    /// order, truncated to `limit` when given.
    async fn query(
        &self,
        resource: ResourceType,
        filters: &BTreeMap<String, String>,
        limit: Option<u64>,
    ) -> Result<Vec<Record>, EntityStoreError>;
}

/// Process-local entity store.
#[derive(Default)]
pub struct MemoryEntityStore {
    tables: RwLock<HashMap<ResourceType, BTreeMap<String, Record>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn get(
        &self,
        resource: ResourceType,
        key: &str,
    ) -> Result<Option<Record>, EntityStoreError> {
        let tables = self.tables.read().await;
        Ok(tables.get(&resource).and_then(|t| t.get(key)).cloned())
    }

    async fn keys(&self, resource: ResourceType) -> Result<HashSet<String>, EntityStoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&resource)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        resource: ResourceType,
        key: &str,
        record: Record,
    ) -> Result<(), EntityStoreError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(resource).or_default();
        if table.contains_key(key) {
            return Err(EntityStoreError::Rejected(format!(
                "a {} record with key '{}' already exists",
                resource.as_str(),
                key
            )));
        }
        table.insert(key.to_string(), record);
        Ok(())
    }

    async fn update(
        &self,
        resource: ResourceType,
        key: &str,
        record: Record,
    ) -> Result<(), EntityStoreError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(resource).or_default();
        match table.get_mut(key) {
            Some(existing) => {
                *existing = record;
                Ok(())
            },
            None => Err(EntityStoreError::Rejected(format!(
                "no {} record with key '{}' to update",
                resource.as_str(),
                key
            ))),
        }
    }

    async fn query(
        &self,
        resource: ResourceType,
        filters: &BTreeMap<String, String>,
        limit: Option<u64>,
    ) -> Result<Vec<Record>, EntityStoreError> {
        let tables = self.tables.read().await;
        let records = tables
            .get(&resource)
            .map(|t| {
                t.values()
                    .filter(|record| {
                        filters
                            .iter()
                            .all(|(field, want)| record.get(field).map_or(false, |v| v == want))
                    })
                    .take(limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(code: &str, name: &str) -> Record {
        let mut r = Record::new();
        r.insert("student_code".to_string(), code.to_string());
        r.insert("first_name".to_string(), name.to_string());
        r
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_key() {
        let store = MemoryEntityStore::new();
        store
            .insert(ResourceType::Students, "S001", student("S001", "Ana"))
            .await
            .unwrap();

        let err = store
            .insert(ResourceType::Students, "S001", student("S001", "Ben"))
            .await
            .unwrap_err();
        assert!(matches!(err, EntityStoreError::Rejected(_)));

        // The original record is untouched.
        let record = store.get(ResourceType::Students, "S001").await.unwrap().unwrap();
        assert_eq!(record.get("first_name").map(String::as_str), Some("Ana"));
    }

    #[tokio::test]
    async fn update_requires_existing_key() {
        let store = MemoryEntityStore::new();
        let err = store
            .update(ResourceType::Students, "S404", student("S404", "Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, EntityStoreError::Rejected(_)));

        store
            .insert(ResourceType::Students, "S001", student("S001", "Ana"))
            .await
            .unwrap();
        store
            .update(ResourceType::Students, "S001", student("S001", "Anna"))
            .await
            .unwrap();
        let record = store.get(ResourceType::Students, "S001").await.unwrap().unwrap();
        assert_eq!(record.get("first_name").map(String::as_str), Some("Anna"));
    }

    #[tokio::test]
    async fn query_filters_and_limits_in_key_order() {
        let store = MemoryEntityStore::new();
        for (code, name) in [("S003", "Cara"), ("S001", "Ana"), ("S002", "Ana")] {
            store
                .insert(ResourceType::Students, code, student(code, name))
                .await
                .unwrap();
        }

        let mut filters = BTreeMap::new();
        filters.insert("first_name".to_string(), "Ana".to_string());
        let records = store
            .query(ResourceType::Students, &filters, None)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("student_code").map(String::as_str), Some("S001"));

        let records = store
            .query(ResourceType::Students, &BTreeMap::new(), Some(2))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn resources_are_isolated() {
        let store = MemoryEntityStore::new();
        store
            .insert(ResourceType::Students, "S001", student("S001", "Ana"))
            .await
            .unwrap();

        assert!(store.get(ResourceType::Courses, "S001").await.unwrap().is_none());
        assert!(store.keys(ResourceType::Courses).await.unwrap().is_empty());
    }
}
