use async_trait::async_trait;

use super::{DatabaseError, Record, Store};
use crate::resources::ResourceSpec;

/// Typed accessors over the relational store.
///
/// Every catalog call is scoped by `store_id`; a row belonging to another
/// store is indistinguishable from a missing one. "Not found" is reported as
/// `None`, never as an error.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// The store with this id, if `user_id` owns it
    async fn find_owned_store(&self, store_id: &str, user_id: &str) -> Result<Option<Store>, DatabaseError>;

    /// The first store `user_id` owns, in creation order
    async fn first_store_owned_by(&self, user_id: &str) -> Result<Option<Store>, DatabaseError>;

    async fn stores_owned_by(&self, user_id: &str) -> Result<Vec<Store>, DatabaseError>;

    async fn create_store(&self, user_id: &str, name: &str) -> Result<Store, DatabaseError>;

    async fn rename_store(&self, store_id: &str, user_id: &str, name: &str) -> Result<Option<Store>, DatabaseError>;

    async fn delete_store(&self, store_id: &str, user_id: &str) -> Result<Option<Store>, DatabaseError>;

    /// Insert one row built from already-validated `fields`
    async fn insert_resource(&self, spec: &ResourceSpec, store_id: &str, fields: &Record) -> Result<Record, DatabaseError>;

    async fn list_resources(&self, spec: &ResourceSpec, store_id: &str) -> Result<Vec<Record>, DatabaseError>;

    async fn find_resource(&self, spec: &ResourceSpec, store_id: &str, id: &str) -> Result<Option<Record>, DatabaseError>;

    async fn update_resource(
        &self,
        spec: &ResourceSpec,
        store_id: &str,
        id: &str,
        fields: &Record,
    ) -> Result<Option<Record>, DatabaseError>;

    async fn delete_resource(&self, spec: &ResourceSpec, store_id: &str, id: &str) -> Result<Option<Record>, DatabaseError>;
}
