//! Data access for users and products
//!
//! Handlers talk to the stores through the `UserStore` and `ProductStore`
//! traits; the PostgreSQL repositories are the production implementations.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Identity, NewProduct, Product, ProductState, User};

pub mod product;

pub use product::ProductRepository;

/// Lookup of registered users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the user whose email, university, username and phone all match
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<User>>;
}

/// Product persistence
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>>;

    /// Insert a new product and return it with its assigned id
    async fn insert(&self, product: &NewProduct) -> Result<Product>;

    async fn update_state(&self, id: i64, state: ProductState) -> Result<()>;
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, university, phone, username
            FROM users
            WHERE email = $1 AND university = $2 AND username = $3 AND phone = $4
            LIMIT 1
            "#,
        )
        .bind(&identity.email)
        .bind(&identity.university)
        .bind(&identity.username)
        .bind(&identity.phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
