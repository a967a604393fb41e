use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DatabaseError, Datastore, Record, Store};
use crate::resources::{ResourceSpec, CATALOG};

type Rows = HashMap<&'static str, Vec<Record>>;

/// Process-local datastore for tests and `serve --in-memory`.
///
/// Rows keep insertion order. Reference fields behave like the foreign keys
/// in Postgres: a write naming a missing row, or deleting a row (or store)
/// that is still referenced, fails with `DatabaseError::ForeignKey`.
#[derive(Default)]
pub struct MemoryDatastore {
    stores: RwLock<Vec<Store>>,
    // collection -> rows
    resources: RwLock<Rows>,
}

fn now_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn in_scope(record: &Record, store_id: &str, id: Option<&str>) -> bool {
    let field_is = |key: &str, expected: &str| record.get(key).and_then(Value::as_str) == Some(expected);
    field_is("storeId", store_id) && id.map_or(true, |id| field_is("id", id))
}

fn row_exists(resources: &Rows, collection: &str, id: &str) -> bool {
    resources
        .get(collection)
        .is_some_and(|rows| rows.iter().any(|row| row.get("id").and_then(Value::as_str) == Some(id)))
}

/// First reference in `fields` whose target row does not exist in any store
fn dangling_reference(resources: &Rows, spec: &ResourceSpec, fields: &Record) -> Option<String> {
    spec.fields.iter().find_map(|field| {
        let target = field.references()?;
        let id = fields.get(field.name)?.as_str()?;
        (!row_exists(resources, target, id))
            .then(|| format!("{}.{} = {} is not present in {}", spec.table, field.name, id, target))
    })
}

/// First row, in any collection, still pointing at `id` of `spec`
fn referencing_row(resources: &Rows, spec: &ResourceSpec, id: &str) -> Option<String> {
    CATALOG.iter().find_map(|other| {
        let rows = resources.get(other.collection)?;
        other
            .fields
            .iter()
            .filter(|field| field.references() == Some(spec.collection))
            .find(|field| rows.iter().any(|row| row.get(field.name).and_then(Value::as_str) == Some(id)))
            .map(|field| format!("{} {} is still referenced from {}.{}", spec.table, id, other.table, field.name))
    })
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a store with a caller-chosen id
    pub async fn seed_store(&self, id: &str, user_id: &str, name: &str) -> Store {
        let now = Utc::now();
        let store = Store {
            id: id.to_string(),
            name: name.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.stores.write().await.push(store.clone());
        store
    }
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_owned_store(&self, store_id: &str, user_id: &str) -> Result<Option<Store>, DatabaseError> {
        let stores = self.stores.read().await;
        Ok(stores
            .iter()
            .find(|store| store.id == store_id && store.is_owned_by(user_id))
            .cloned())
    }

    async fn first_store_owned_by(&self, user_id: &str) -> Result<Option<Store>, DatabaseError> {
        let stores = self.stores.read().await;
        Ok(stores.iter().find(|store| store.is_owned_by(user_id)).cloned())
    }

    async fn stores_owned_by(&self, user_id: &str) -> Result<Vec<Store>, DatabaseError> {
        let stores = self.stores.read().await;
        Ok(stores.iter().filter(|store| store.is_owned_by(user_id)).cloned().collect())
    }

    async fn create_store(&self, user_id: &str, name: &str) -> Result<Store, DatabaseError> {
        Ok(self.seed_store(&Uuid::new_v4().to_string(), user_id, name).await)
    }

    async fn rename_store(&self, store_id: &str, user_id: &str, name: &str) -> Result<Option<Store>, DatabaseError> {
        let mut stores = self.stores.write().await;
        Ok(stores
            .iter_mut()
            .find(|store| store.id == store_id && store.is_owned_by(user_id))
            .map(|store| {
                store.name = name.to_string();
                store.updated_at = Utc::now();
                store.clone()
            }))
    }

    async fn delete_store(&self, store_id: &str, user_id: &str) -> Result<Option<Store>, DatabaseError> {
        // Lock order: stores, then resources
        let mut stores = self.stores.write().await;
        let Some(position) = stores
            .iter()
            .position(|store| store.id == store_id && store.is_owned_by(user_id))
        else {
            return Ok(None);
        };

        let resources = self.resources.read().await;
        if let Some((collection, _)) = resources
            .iter()
            .find(|(_, rows)| rows.iter().any(|row| in_scope(row, store_id, None)))
        {
            return Err(DatabaseError::ForeignKey(format!(
                "store {} is still referenced from {}",
                store_id, collection
            )));
        }

        Ok(Some(stores.remove(position)))
    }

    async fn insert_resource(&self, spec: &ResourceSpec, store_id: &str, fields: &Record) -> Result<Record, DatabaseError> {
        let now = now_string();
        let mut record = fields.clone();
        record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        record.insert("storeId".to_string(), Value::String(store_id.to_string()));
        record.insert("createdAt".to_string(), Value::String(now.clone()));
        record.insert("updatedAt".to_string(), Value::String(now));

        let mut resources = self.resources.write().await;
        if let Some(detail) = dangling_reference(&resources, spec, fields) {
            return Err(DatabaseError::ForeignKey(detail));
        }
        resources.entry(spec.collection).or_default().push(record.clone());
        Ok(record)
    }

    async fn list_resources(&self, spec: &ResourceSpec, store_id: &str) -> Result<Vec<Record>, DatabaseError> {
        let resources = self.resources.read().await;
        Ok(resources
            .get(spec.collection)
            .map(|rows| rows.iter().filter(|row| in_scope(row, store_id, None)).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_resource(&self, spec: &ResourceSpec, store_id: &str, id: &str) -> Result<Option<Record>, DatabaseError> {
        let resources = self.resources.read().await;
        Ok(resources
            .get(spec.collection)
            .and_then(|rows| rows.iter().find(|row| in_scope(row, store_id, Some(id))))
            .cloned())
    }

    async fn update_resource(
        &self,
        spec: &ResourceSpec,
        store_id: &str,
        id: &str,
        fields: &Record,
    ) -> Result<Option<Record>, DatabaseError> {
        let mut resources = self.resources.write().await;
        if let Some(detail) = dangling_reference(&resources, spec, fields) {
            return Err(DatabaseError::ForeignKey(detail));
        }
        let Some(row) = resources
            .get_mut(spec.collection)
            .and_then(|rows| rows.iter_mut().find(|row| in_scope(row, store_id, Some(id))))
        else {
            return Ok(None);
        };

        for (key, value) in fields {
            row.insert(key.clone(), value.clone());
        }
        row.insert("updatedAt".to_string(), Value::String(now_string()));
        Ok(Some(row.clone()))
    }

    async fn delete_resource(&self, spec: &ResourceSpec, store_id: &str, id: &str) -> Result<Option<Record>, DatabaseError> {
        let mut resources = self.resources.write().await;
        let exists = resources
            .get(spec.collection)
            .is_some_and(|rows| rows.iter().any(|row| in_scope(row, store_id, Some(id))));
        if !exists {
            return Ok(None);
        }
        if let Some(detail) = referencing_row(&resources, spec, id) {
            return Err(DatabaseError::ForeignKey(detail));
        }

        let Some(rows) = resources.get_mut(spec.collection) else {
            return Ok(None);
        };
        Ok(rows
            .iter()
            .position(|row| in_scope(row, store_id, Some(id)))
            .map(|position| rows.remove(position)))
    }
}
