use anyhow::{Context, Result};
use shared::{ColumnValue, Insertable, ProductRow};
use sqlx::{migrate::MigrateDatabase, sqlite::SqliteRow, Row, Sqlite, SqlitePool};
use std::sync::Arc;
use thiserror::Error;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:db.sqlite3";

// Schema script applied once at startup, relative to the working directory
const SCHEMA_PATH: &str = "db.schema.sql";

/// Errors surfaced by catalog storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Contract violation inside `insert`: an `Insertable` handed over
    /// mismatched key and value lists. Never caused by user input.
    #[error("insert received {keys} columns but {values} values")]
    KeyValueMismatch { keys: usize, values: usize },
}

/// Db owns the single connection pool to the products database.
#[derive(Clone)]
pub struct Db {
    pool: Arc<SqlitePool>,
}

impl Db {
    /// Open the database at `url` (creating it if needed) and apply the
    /// given schema script.
    pub async fn new(url: &str, schema: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        sqlx::query(schema).execute(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database. An unreadable schema script or an
    /// unopenable store is a startup-fatal error.
    pub async fn init() -> Result<Self> {
        let schema = std::fs::read_to_string(SCHEMA_PATH)
            .with_context(|| format!("failed to read schema script {SCHEMA_PATH}"))?;
        Self::new(DATABASE_URL, &schema).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url, include_str!("../../db.schema.sql")).await
    }

    /// Read every stored product as a flattened row, in storage order.
    /// An empty table yields an empty vec.
    pub async fn get_all(&self) -> Result<Vec<ProductRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT Id, Sku, Name, Price, Type, Size, Width, Length, Height, Weight \
             FROM products",
        )
        .fetch_all(&*self.pool)
        .await?;

        let products = rows
            .iter()
            .map(map_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(products)
    }

    /// Insert one product. The statement is built from the item's column
    /// list and the values are bound positionally, so the key and value
    /// lists must line up 1:1.
    pub async fn insert(&self, item: &(dyn Insertable + Sync)) -> Result<(), StoreError> {
        let keys = item.keys();
        let values = item.values();
        if keys.len() != values.len() {
            return Err(StoreError::KeyValueMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!(
            "INSERT INTO products ({}) VALUES ({})",
            keys.join(", "),
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for value in values {
            query = match value {
                ColumnValue::Text(text) => query.bind(text),
                ColumnValue::Real(real) => query.bind(real),
            };
        }
        query.execute(&*self.pool).await?;
        Ok(())
    }

    /// Delete every row whose id appears in `ids`. An empty list is a
    /// no-op; ids with no matching row are silently ignored.
    pub async fn delete_by_ids(&self, ids: &[i64]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM products WHERE Id IN ({})", placeholders);

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        query.execute(&*self.pool).await?;
        Ok(())
    }
}

fn map_row(row: &SqliteRow) -> Result<ProductRow, sqlx::Error> {
    Ok(ProductRow {
        id: row.try_get("Id")?,
        sku: row.try_get("Sku")?,
        name: row.try_get("Name")?,
        price: row.try_get("Price")?,
        product_type: row.try_get("Type")?,
        size: row.try_get("Size")?,
        width: row.try_get("Width")?,
        length: row.try_get("Length")?,
        height: row.try_get("Height")?,
        weight: row.try_get("Weight")?,
    })
}
