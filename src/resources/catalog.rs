// Catalog entities managed per store

use super::{FieldSpec, ResourceSpec};

/// Fields accepted when creating or renaming a store
pub const STORE_FIELDS: &[FieldSpec] = &[FieldSpec::text("name", "Name")];

pub static BILLBOARDS: ResourceSpec = ResourceSpec {
    name: "Billboard",
    collection: "billboards",
    table: "billboards",
    tag: "BILLBOARD",
    fields: &[
        FieldSpec::text("label", "Label"),
        FieldSpec::text("imageUrl", "Image URL"),
    ],
};

pub static CATEGORIES: ResourceSpec = ResourceSpec {
    name: "Category",
    collection: "categories",
    table: "categories",
    tag: "CATEGORY",
    fields: &[
        FieldSpec::text("name", "Name"),
        FieldSpec::reference("billboardId", "Billboard ID", "billboards"),
    ],
};

pub static SIZES: ResourceSpec = ResourceSpec {
    name: "Size",
    collection: "sizes",
    table: "sizes",
    tag: "SIZE",
    fields: &[FieldSpec::text("name", "Name"), FieldSpec::text("value", "Value")],
};

pub static COLORS: ResourceSpec = ResourceSpec {
    name: "Color",
    collection: "colors",
    table: "colors",
    tag: "COLOR",
    fields: &[FieldSpec::text("name", "Name"), FieldSpec::text("value", "Value")],
};

pub static PRODUCTS: ResourceSpec = ResourceSpec {
    name: "Product",
    collection: "products",
    table: "products",
    tag: "PRODUCT",
    fields: &[
        FieldSpec::text("name", "Name"),
        FieldSpec::number("price", "Price"),
        FieldSpec::reference("categoryId", "Category ID", "categories"),
        FieldSpec::reference("sizeId", "Size ID", "sizes"),
        FieldSpec::reference("colorId", "Color ID", "colors"),
        FieldSpec::boolean("isFeatured", "Featured"),
        FieldSpec::boolean("isArchived", "Archived"),
    ],
};

/// Every entity routed under `/api/{storeId}/`
pub static CATALOG: &[&ResourceSpec] = &[&BILLBOARDS, &CATEGORIES, &SIZES, &COLORS, &PRODUCTS];
