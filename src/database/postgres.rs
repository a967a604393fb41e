use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use uuid::Uuid;

use super::{DatabaseError, DatabaseManager, Datastore, Record, Store};
use crate::resources::{FieldKind, FieldSpec, ResourceSpec};

const STORE_COLUMNS: &str = r#""id", "name", "userId", "createdAt", "updatedAt""#;

/// PostgreSQL-backed datastore.
///
/// Catalog rows come back through `row_to_json`, so column names (camelCase,
/// quoted) are exactly the keys clients see.
#[derive(Clone)]
pub struct PgDatastore {
    pool: PgPool,
}

impl PgDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Validated fields in schema order; SQL text and binds both iterate this
fn present_fields<'a>(spec: &'a ResourceSpec, fields: &'a Record) -> Vec<(&'a FieldSpec, &'a Value)> {
    spec.fields
        .iter()
        .filter_map(|field| fields.get(field.name).map(|value| (field, value)))
        .collect()
}

fn bind_field<'q>(query: PgQuery<'q>, field: &FieldSpec, value: &Value) -> PgQuery<'q> {
    match field.kind {
        FieldKind::Text | FieldKind::Reference(_) => query.bind(value.as_str().map(str::to_owned)),
        FieldKind::Number => query.bind(value.as_f64()),
        FieldKind::Boolean => query.bind(value.as_bool()),
    }
}

fn row_to_record(row: PgRow) -> Result<Record, DatabaseError> {
    match row.try_get::<Value, _>("data")? {
        Value::Object(record) => Ok(record),
        other => Err(DatabaseError::Decode(format!("expected a JSON object, got {}", other))),
    }
}

fn insert_sql(spec: &ResourceSpec, fields: &[(&FieldSpec, &Value)]) -> String {
    let mut columns = vec![
        DatabaseManager::quote_identifier("id"),
        DatabaseManager::quote_identifier("storeId"),
    ];
    columns.extend(fields.iter().map(|(field, _)| DatabaseManager::quote_identifier(field.name)));
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();

    format!(
        "WITH affected AS (INSERT INTO {} ({}) VALUES ({}) RETURNING *) \
         SELECT row_to_json(affected) AS data FROM affected",
        DatabaseManager::quote_identifier(spec.table),
        columns.join(", "),
        placeholders.join(", "),
    )
}

fn update_sql(spec: &ResourceSpec, fields: &[(&FieldSpec, &Value)]) -> String {
    // $1 = id, $2 = storeId
    let mut assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (field, _))| format!("{} = ${}", DatabaseManager::quote_identifier(field.name), i + 3))
        .collect();
    assignments.push(r#""updatedAt" = now()"#.to_string());

    format!(
        "WITH affected AS (UPDATE {} SET {} WHERE \"id\" = $1 AND \"storeId\" = $2 RETURNING *) \
         SELECT row_to_json(affected) AS data FROM affected",
        DatabaseManager::quote_identifier(spec.table),
        assignments.join(", "),
    )
}

#[async_trait]
impl Datastore for PgDatastore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn find_owned_store(&self, store_id: &str, user_id: &str) -> Result<Option<Store>, DatabaseError> {
        let sql = format!(r#"SELECT {} FROM "stores" WHERE "id" = $1 AND "userId" = $2"#, STORE_COLUMNS);
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn first_store_owned_by(&self, user_id: &str) -> Result<Option<Store>, DatabaseError> {
        let sql = format!(
            r#"SELECT {} FROM "stores" WHERE "userId" = $1 ORDER BY "createdAt" ASC LIMIT 1"#,
            STORE_COLUMNS
        );
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn stores_owned_by(&self, user_id: &str) -> Result<Vec<Store>, DatabaseError> {
        let sql = format!(
            r#"SELECT {} FROM "stores" WHERE "userId" = $1 ORDER BY "createdAt" ASC"#,
            STORE_COLUMNS
        );
        let stores = sqlx::query_as::<_, Store>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(stores)
    }

    async fn create_store(&self, user_id: &str, name: &str) -> Result<Store, DatabaseError> {
        let sql = format!(
            r#"INSERT INTO "stores" ("id", "name", "userId") VALUES ($1, $2, $3) RETURNING {}"#,
            STORE_COLUMNS
        );
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(store)
    }

    async fn rename_store(&self, store_id: &str, user_id: &str, name: &str) -> Result<Option<Store>, DatabaseError> {
        let sql = format!(
            r#"UPDATE "stores" SET "name" = $3, "updatedAt" = now() WHERE "id" = $1 AND "userId" = $2 RETURNING {}"#,
            STORE_COLUMNS
        );
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn delete_store(&self, store_id: &str, user_id: &str) -> Result<Option<Store>, DatabaseError> {
        let sql = format!(
            r#"DELETE FROM "stores" WHERE "id" = $1 AND "userId" = $2 RETURNING {}"#,
            STORE_COLUMNS
        );
        let store = sqlx::query_as::<_, Store>(&sql)
            .bind(store_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn insert_resource(&self, spec: &ResourceSpec, store_id: &str, fields: &Record) -> Result<Record, DatabaseError> {
        let present = present_fields(spec, fields);
        let sql = insert_sql(spec, &present);

        let mut query = sqlx::query(&sql).bind(Uuid::new_v4().to_string()).bind(store_id);
        for (field, value) in &present {
            query = bind_field(query, field, value);
        }

        let row = query.fetch_one(&self.pool).await?;
        row_to_record(row)
    }

    async fn list_resources(&self, spec: &ResourceSpec, store_id: &str) -> Result<Vec<Record>, DatabaseError> {
        let sql = format!(
            r#"SELECT row_to_json(t) AS data FROM {} t WHERE t."storeId" = $1"#,
            DatabaseManager::quote_identifier(spec.table)
        );
        let rows = sqlx::query(&sql).bind(store_id).fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_record).collect()
    }

    async fn find_resource(&self, spec: &ResourceSpec, store_id: &str, id: &str) -> Result<Option<Record>, DatabaseError> {
        let sql = format!(
            r#"SELECT row_to_json(t) AS data FROM {} t WHERE t."id" = $1 AND t."storeId" = $2"#,
            DatabaseManager::quote_identifier(spec.table)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_record).transpose()
    }

    async fn update_resource(
        &self,
        spec: &ResourceSpec,
        store_id: &str,
        id: &str,
        fields: &Record,
    ) -> Result<Option<Record>, DatabaseError> {
        let present = present_fields(spec, fields);
        let sql = update_sql(spec, &present);

        let mut query = sqlx::query(&sql).bind(id).bind(store_id);
        for (field, value) in &present {
            query = bind_field(query, field, value);
        }

        let row = query.fetch_optional(&self.pool).await?;
        row.map(row_to_record).transpose()
    }

    async fn delete_resource(&self, spec: &ResourceSpec, store_id: &str, id: &str) -> Result<Option<Record>, DatabaseError> {
        let sql = format!(
            "WITH affected AS (DELETE FROM {} WHERE \"id\" = $1 AND \"storeId\" = $2 RETURNING *) \
             SELECT row_to_json(affected) AS data FROM affected",
            DatabaseManager::quote_identifier(spec.table)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_record).transpose()
    }
}
