//! Order use cases: place, add item, remove item, checkout, history.
//!
//! Each use case loads the aggregate scoped to the caller, applies exactly
//! one aggregate operation and persists the result. Nothing is saved when
//! the operation fails.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::aggregates::Order;
use crate::domain::value_objects::Money;
use crate::error::Error;
use crate::events::{EventPublisher, OrderEvent};
use crate::repository::{OrderRepository, ProductStore};

/// One submitted item of a place-order request.
#[derive(Clone, Debug)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductStore>,
    events: EventPublisher,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, catalog: Arc<dyn ProductStore>, events: EventPublisher) -> Self {
        Self { orders, catalog, events }
    }

    /// Creates a new order owned by `caller` from the submitted items. The
    /// total is derived from catalog price snapshots; any client-computed
    /// total is a display hint and never stored. An empty item list yields
    /// an empty open cart.
    #[tracing::instrument(skip(self, items), fields(caller = %caller))]
    pub async fn place(&self, caller: Uuid, items: &[NewOrderItem]) -> Result<Order, Error> {
        let mut order = Order::create(caller);
        for item in items {
            let unit_price = self.resolve_price(item.product_id).await?;
            order.add_item(item.product_id, item.quantity, unit_price)?;
        }
        self.orders.create(&order).await?;
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order placed");
        self.events
            .publish(OrderEvent::Placed {
                order_id: order.id(),
                owner_id: caller,
                total_amount: order.total_amount().amount(),
            })
            .await;
        Ok(order)
    }

    #[tracing::instrument(skip(self), fields(caller = %caller, order_id = %order_id))]
    pub async fn add_item(&self, caller: Uuid, order_id: Uuid, product_id: Uuid, quantity: u32) -> Result<Order, Error> {
        let mut order = self.load(caller, order_id).await?;
        let unit_price = self.resolve_price(product_id).await?;
        order.add_item(product_id, quantity, unit_price)?;
        self.orders.save(&order).await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self), fields(caller = %caller, order_id = %order_id))]
    pub async fn remove_item(&self, caller: Uuid, order_id: Uuid, line_item_id: Uuid) -> Result<Order, Error> {
        let mut order = self.load(caller, order_id).await?;
        order.remove_item(line_item_id)?;
        self.orders.save(&order).await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self), fields(caller = %caller, order_id = %order_id))]
    pub async fn checkout(&self, caller: Uuid, order_id: Uuid) -> Result<Order, Error> {
        let mut order = self.load(caller, order_id).await?;
        order.checkout()?;
        self.orders.save(&order).await?;
        tracing::info!(total = %order.total_amount(), "order checked out");
        self.events
            .publish(OrderEvent::CheckedOut {
                order_id: order.id(),
                owner_id: caller,
                total_amount: order.total_amount().amount(),
            })
            .await;
        Ok(order)
    }

    /// All orders of the caller, newest first. An empty history is a
    /// success, not an error.
    pub async fn history(&self, caller: Uuid) -> Result<Vec<Order>, Error> {
        Ok(self.orders.list_for_owner(caller).await?)
    }

    async fn load(&self, caller: Uuid, order_id: Uuid) -> Result<Order, Error> {
        self.orders
            .find_for_owner(order_id, caller)
            .await?
            .ok_or_else(|| Error::not_found("Order not found or does not belong to you"))
    }

    async fn resolve_price(&self, product_id: Uuid) -> Result<Money, Error> {
        Ok(self
            .catalog
            .get(product_id)
            .await?
            .ok_or_else(|| Error::not_found("Product not found"))?
            .price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::domain::aggregates::OrderStatus;
    use crate::domain::product::Product;
    use crate::domain::value_objects::Money;
    use crate::repository::{InMemoryOrderRepository, InMemoryProductStore};

    async fn service_with_product(price_cents: i64) -> (OrderService, Arc<InMemoryProductStore>, Uuid) {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let catalog = Arc::new(InMemoryProductStore::new());
        let product = Product::create(
            Uuid::new_v4(),
            "Widget",
            "A widget",
            Money::new(Decimal::new(price_cents, 2)),
            "https://img.example/widget.png",
            "shop/widget",
        );
        catalog.insert(&product).await.unwrap();
        let service = OrderService::new(orders, catalog.clone(), EventPublisher::disabled());
        (service, catalog, product.id)
    }

    #[tokio::test]
    async fn test_place_derives_total_from_catalog() {
        let (service, _, product_id) = service_with_product(999).await;
        let caller = Uuid::new_v4();
        let order = service
            .place(caller, &[NewOrderItem { product_id, quantity: 2 }])
            .await
            .unwrap();
        assert_eq!(order.total_amount().amount(), Decimal::new(1998, 2));
        assert_eq!(order.status(), OrderStatus::Open);
        assert_eq!(order.owner_id(), caller);
    }

    #[tokio::test]
    async fn test_place_with_no_items_creates_empty_cart() {
        let (service, _, _) = service_with_product(999).await;
        let order = service.place(Uuid::new_v4(), &[]).await.unwrap();
        assert!(order.is_empty());
        assert_eq!(order.total_amount(), Money::zero());
    }

    #[tokio::test]
    async fn test_place_with_unknown_product_fails() {
        let (service, _, _) = service_with_product(999).await;
        let result = service
            .place(Uuid::new_v4(), &[NewOrderItem { product_id: Uuid::new_v4(), quantity: 1 }])
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_item_to_foreign_order_is_not_found() {
        let (service, _, product_id) = service_with_product(999).await;
        let owner = Uuid::new_v4();
        let order = service
            .place(owner, &[NewOrderItem { product_id, quantity: 1 }])
            .await
            .unwrap();

        let stranger = Uuid::new_v4();
        let result = service.add_item(stranger, order.id(), product_id, 1).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_catalog_change() {
        let (service, catalog, product_id) = service_with_product(999).await;
        let caller = Uuid::new_v4();
        let order = service
            .place(caller, &[NewOrderItem { product_id, quantity: 2 }])
            .await
            .unwrap();

        // Reprice the product in the catalog.
        let mut repriced = catalog.get(product_id).await.unwrap().unwrap();
        repriced.price = Money::new(Decimal::new(5000, 2));
        catalog.insert(&repriced).await.unwrap();

        let unchanged = service
            .orders
            .find_for_owner(order.id(), caller)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.items()[0].unit_price.amount(), Decimal::new(999, 2));
        assert_eq!(unchanged.total_amount().amount(), Decimal::new(1998, 2));

        // New additions pick up the new price while the old snapshot stays.
        let second = service
            .place(caller, &[NewOrderItem { product_id, quantity: 1 }])
            .await
            .unwrap();
        assert_eq!(second.total_amount().amount(), Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn test_checkout_then_mutation_conflicts() {
        let (service, _, product_id) = service_with_product(999).await;
        let caller = Uuid::new_v4();
        let order = service
            .place(caller, &[NewOrderItem { product_id, quantity: 2 }])
            .await
            .unwrap();

        let done = service.checkout(caller, order.id()).await.unwrap();
        assert_eq!(done.status(), OrderStatus::Completed);

        let again = service.checkout(caller, order.id()).await;
        assert!(matches!(again, Err(Error::InvalidState(_))));
        let add = service.add_item(caller, order.id(), product_id, 1).await;
        assert!(matches!(add, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_remove_item_persists_new_total() {
        let (service, _, product_id) = service_with_product(500).await;
        let caller = Uuid::new_v4();
        let order = service
            .place(caller, &[NewOrderItem { product_id, quantity: 4 }])
            .await
            .unwrap();
        let item_id = order.items()[0].id;

        let updated = service.remove_item(caller, order.id(), item_id).await.unwrap();
        assert!(updated.is_empty());
        assert_eq!(updated.total_amount(), Money::zero());

        let reloaded = service.history(caller).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded[0].is_empty());
    }

    #[tokio::test]
    async fn test_history_is_empty_for_new_user() {
        let (service, _, _) = service_with_product(999).await;
        assert!(service.history(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
