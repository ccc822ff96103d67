//! In-memory stores with the same semantics as the Postgres ones, used by
//! the test suites and for running the service without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::aggregates::Order;
use crate::domain::product::Product;

use super::{OrderRepository, ProductStore, RepositoryError};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(())
    }

    async fn find_for_owner(&self, order_id: Uuid, owner_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .orders
            .read()
            .await
            .get(&order_id)
            .filter(|o| o.owner_id() == owner_id)
            .cloned())
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.get(&order.id()) {
            Some(stored) if stored.version() == order.version() => {
                let mut next = order.clone();
                next.set_version(order.version() + 1);
                orders.insert(next.id(), next);
                Ok(())
            }
            _ => Err(RepositoryError::Conflict),
        }
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.owner_id() == owner_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(orders)
    }
}

#[derive(Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products.write().await.insert(product.id, product.clone());
        Ok(())
    }

    async fn get(&self, product_id: Uuid) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn delete(&self, product_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.products.write().await.remove(&product_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::domain::value_objects::Money;

    #[tokio::test]
    async fn test_find_for_owner_hides_foreign_orders() {
        let repo = InMemoryOrderRepository::new();
        let owner = Uuid::new_v4();
        let order = Order::create(owner);
        repo.create(&order).await.unwrap();

        let stranger = Uuid::new_v4();
        assert!(repo.find_for_owner(order.id(), stranger).await.unwrap().is_none());
        assert!(repo.find_for_owner(order.id(), owner).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_rejects_stale_writers() {
        let repo = InMemoryOrderRepository::new();
        let owner = Uuid::new_v4();
        let order = Order::create(owner);
        repo.create(&order).await.unwrap();

        // Two handlers load the same state.
        let mut first = repo.find_for_owner(order.id(), owner).await.unwrap().unwrap();
        let mut second = repo.find_for_owner(order.id(), owner).await.unwrap().unwrap();

        first.add_item(Uuid::new_v4(), 1, Money::new(Decimal::new(100, 2))).unwrap();
        repo.save(&first).await.unwrap();

        second.add_item(Uuid::new_v4(), 2, Money::new(Decimal::new(100, 2))).unwrap();
        assert!(matches!(repo.save(&second).await, Err(RepositoryError::Conflict)));

        let stored = repo.find_for_owner(order.id(), owner).await.unwrap().unwrap();
        assert_eq!(stored.version(), 1);
        assert_eq!(stored.items().len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_owner_empty_is_ok() {
        let repo = InMemoryOrderRepository::new();
        assert!(repo.list_for_owner(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
