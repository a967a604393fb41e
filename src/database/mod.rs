pub mod datastore;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

pub use datastore::Datastore;
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryDatastore;
pub use models::store::Store;
pub use postgres::PgDatastore;

/// A catalog row as returned to clients: camelCase keys, timestamps as strings
pub type Record = serde_json::Map<String, serde_json::Value>;
