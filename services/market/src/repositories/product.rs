//! Product repository for database operations

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};

use super::ProductStore;
use crate::models::{NewProduct, Photo, Product, ProductState};

const PRODUCT_COLUMNS: &str = "id, product_name, price, description, university, item_condition, \
     qty, state, user_id, photos, created_at, updated_at";

/// Product repository for database operations
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn product_from_row(row: PgRow) -> Result<Product> {
    let state: String = row.try_get("state")?;
    let photos: Option<Json<Vec<Photo>>> = row.try_get("photos")?;

    Ok(Product {
        id: row.try_get("id")?,
        product_name: row.try_get("product_name")?,
        price: row.try_get("price")?,
        description: row.try_get("description")?,
        university: row.try_get("university")?,
        condition: row.try_get("item_condition")?,
        qty: row.try_get("qty")?,
        state: state.parse::<ProductState>()?,
        user_id: row.try_get("user_id")?,
        photos: photos.map(|Json(p)| p).unwrap_or_default(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(product_from_row).transpose()
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product> {
        let sql = format!(
            r#"
            INSERT INTO products
                (product_name, price, description, university, item_condition, qty, state, user_id, photos)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(&product.product_name)
            .bind(&product.price)
            .bind(&product.description)
            .bind(&product.university)
            .bind(&product.condition)
            .bind(product.qty)
            .bind(product.state.as_str())
            .bind(product.user_id)
            .bind(Json(&product.photos))
            .fetch_one(&self.pool)
            .await?;

        product_from_row(row)
    }

    async fn update_state(&self, id: i64, state: ProductState) -> Result<()> {
        let result =
            sqlx::query("UPDATE products SET state = $1, updated_at = NOW() WHERE id = $2")
                .bind(state.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?;

        (result.rows_affected() > 0)
            .then_some(())
            .with_context(|| format!("product {id} does not exist"))
    }
}
