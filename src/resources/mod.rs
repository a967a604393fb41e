pub mod catalog;
pub mod schema;

pub use catalog::{BILLBOARDS, CATALOG, CATEGORIES, COLORS, PRODUCTS, SIZES, STORE_FIELDS};
pub use schema::{validate, FieldKind, FieldSpec, FieldViolation};

/// Static description of one store-scoped catalog entity.
///
/// Everything the generic handlers and datastores need to know about an
/// entity lives here: how it is named in messages, where it is routed, which
/// table backs it and which fields a request must carry.
#[derive(Debug)]
pub struct ResourceSpec {
    /// Display name, e.g. "Size"
    pub name: &'static str,
    /// Path segment under `/api/{storeId}/`, e.g. "sizes"
    pub collection: &'static str,
    pub table: &'static str,
    /// Upper-case singular for item log tags, e.g. "SIZE" → `[SIZE_PATCH]`
    pub tag: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ResourceSpec {
    /// Log tag for operations on the whole collection.
    pub fn collection_tag(&self, method: &str) -> String {
        format!("[{}_{}]", self.collection.to_uppercase(), method)
    }

    /// Log tag for operations on a single record.
    pub fn item_tag(&self, method: &str) -> String {
        format!("[{}_{}]", self.tag, method)
    }

    pub fn id_required(&self) -> String {
        format!("{} ID is required", self.name)
    }

    pub fn not_found(&self) -> String {
        format!("{} not found", self.name)
    }
}

/// Catalog entity routed at `collection`
pub fn by_collection(collection: &str) -> Option<&'static ResourceSpec> {
    CATALOG.iter().copied().find(|spec| spec.collection == collection)
}
