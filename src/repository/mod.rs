//! Persistence boundary for orders and the product catalog.
//!
//! The services depend only on these traits; Postgres backs them in
//! production and the in-memory stores back them in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::Order;
use crate::domain::product::Product;

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryOrderRepository, InMemoryProductStore};
pub use postgres::{PgOrderRepository, PgProductStore};

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Another writer saved this order since it was loaded.
    #[error("order was modified concurrently")]
    Conflict,
    #[error("corrupt stored state: {0}")]
    Corrupt(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a newly created aggregate, items included, atomically.
    async fn create(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Loads an order only if it belongs to `owner_id`. Ownership is the
    /// sole authorization boundary for order access.
    async fn find_for_owner(&self, order_id: Uuid, owner_id: Uuid) -> Result<Option<Order>, RepositoryError>;

    /// Persists the full aggregate state (items, total and status together)
    /// guarded by the version the order was loaded at. A stale version
    /// fails with [`RepositoryError::Conflict`].
    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;

    /// All orders owned by `owner_id`, newest first. May be empty.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Order>, RepositoryError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError>;
    async fn get(&self, product_id: Uuid) -> Result<Option<Product>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, RepositoryError>;
    /// Removes the row. Returns false when the product no longer exists.
    async fn delete(&self, product_id: Uuid) -> Result<bool, RepositoryError>;
}
