//! Order Aggregate
//!
//! The consistency boundary for an order and its line items. Every mutation
//! passes through here so the running total always equals the sum of the
//! line items.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug)]
pub struct Order {
    id: Uuid,
    owner_id: Uuid,
    items: Vec<LineItem>,
    total_amount: Money,
    status: OrderStatus,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// One product reference plus quantity and the price snapshot captured when
/// the product was first added. The snapshot never changes afterwards.
#[derive(Clone, Debug)]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl LineItem {
    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity.value()) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    Open,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl Order {
    /// Creates an empty open order owned by `owner_id`.
    pub fn create(owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            items: vec![],
            total_amount: Money::zero(),
            status: OrderStatus::Open,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds an aggregate from persisted state.
    pub(crate) fn restore(
        id: Uuid,
        owner_id: Uuid,
        items: Vec<LineItem>,
        total_amount: Money,
        status: OrderStatus,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self { id, owner_id, items, total_amount, status, version, created_at, updated_at }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn owner_id(&self) -> Uuid { self.owner_id }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn total_amount(&self) -> Money { self.total_amount }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn version(&self) -> i64 { self.version }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub(crate) fn set_version(&mut self, version: i64) { self.version = version; }

    /// Adds `quantity` of a product at the given unit price. If the product
    /// is already in the order its quantity is incremented and the existing
    /// price snapshot is kept.
    pub fn add_item(&mut self, product_id: Uuid, quantity: u32, unit_price: Money) -> Result<(), OrderError> {
        self.ensure_open()?;
        let quantity = Quantity::new(quantity).ok_or(OrderError::InvalidQuantity)?;
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity = existing.quantity.add(quantity);
        } else {
            self.items.push(LineItem { id: Uuid::new_v4(), product_id, quantity, unit_price });
        }
        self.recalculate();
        Ok(())
    }

    /// Deletes one line item by its id.
    pub fn remove_item(&mut self, line_item_id: Uuid) -> Result<(), OrderError> {
        self.ensure_open()?;
        let before = self.items.len();
        self.items.retain(|i| i.id != line_item_id);
        if self.items.len() == before { return Err(OrderError::ItemNotFound); }
        self.recalculate();
        Ok(())
    }

    /// Transitions the order to `Completed`. A second checkout is a
    /// conflict, not a no-op.
    pub fn checkout(&mut self) -> Result<(), OrderError> {
        self.ensure_open()?;
        self.status = OrderStatus::Completed;
        self.touch();
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Open => Ok(()),
            OrderStatus::Completed => Err(OrderError::AlreadyCompleted),
        }
    }

    // Total is always derived from the items, never taken from a caller.
    fn recalculate(&mut self) {
        self.total_amount = self.items.iter().fold(Money::zero(), |acc, i| acc.add(i.line_total()));
        self.touch();
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order is already completed")]
    AlreadyCompleted,
    #[error("quantity must be greater than zero")]
    InvalidQuantity,
    #[error("item not found in the order")]
    ItemNotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn money(cents: i64) -> Money { Money::new(Decimal::new(cents, 2)) }

    #[test]
    fn test_new_order_is_open_and_empty() {
        let owner = Uuid::new_v4();
        let order = Order::create(owner);
        assert_eq!(order.owner_id(), owner);
        assert_eq!(order.status(), OrderStatus::Open);
        assert!(order.is_empty());
        assert_eq!(order.total_amount(), Money::zero());
    }

    #[test]
    fn test_add_item_merges_duplicates() {
        let mut order = Order::create(Uuid::new_v4());
        let product = Uuid::new_v4();
        order.add_item(product, 2, money(1000)).unwrap();
        order.add_item(product, 3, money(1000)).unwrap();
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].quantity.value(), 5);
        assert_eq!(order.total_amount(), money(5000));
    }

    #[test]
    fn test_merge_keeps_existing_price_snapshot() {
        let mut order = Order::create(Uuid::new_v4());
        let product = Uuid::new_v4();
        order.add_item(product, 1, money(1000)).unwrap();
        // A later add at a different catalog price does not overwrite the snapshot.
        order.add_item(product, 1, money(2000)).unwrap();
        assert_eq!(order.items()[0].unit_price, money(1000));
        assert_eq!(order.total_amount(), money(2000));
    }

    #[test]
    fn test_add_item_zero_quantity_fails() {
        let mut order = Order::create(Uuid::new_v4());
        let result = order.add_item(Uuid::new_v4(), 0, money(1000));
        assert_eq!(result, Err(OrderError::InvalidQuantity));
        assert!(order.is_empty());
    }

    #[test]
    fn test_remove_item_restores_total() {
        let mut order = Order::create(Uuid::new_v4());
        order.add_item(Uuid::new_v4(), 4, money(500)).unwrap();
        assert_eq!(order.total_amount(), money(2000));
        let item_id = order.items()[0].id;
        order.remove_item(item_id).unwrap();
        assert!(order.is_empty());
        assert_eq!(order.total_amount(), Money::zero());
    }

    #[test]
    fn test_remove_unknown_item_fails() {
        let mut order = Order::create(Uuid::new_v4());
        order.add_item(Uuid::new_v4(), 1, money(500)).unwrap();
        assert_eq!(order.remove_item(Uuid::new_v4()), Err(OrderError::ItemNotFound));
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let mut order = Order::create(Uuid::new_v4());
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        order.add_item(p1, 2, money(999)).unwrap();
        order.add_item(p2, 1, money(2500)).unwrap();
        order.add_item(p1, 1, money(999)).unwrap();
        let expected: Decimal = order
            .items()
            .iter()
            .map(|i| i.line_total().amount())
            .sum();
        assert_eq!(order.total_amount().amount(), expected);
        let p2_item = order.items().iter().find(|i| i.product_id == p2).unwrap().id;
        order.remove_item(p2_item).unwrap();
        assert_eq!(order.total_amount(), money(2997));
    }

    #[test]
    fn test_checkout_is_one_way() {
        let mut order = Order::create(Uuid::new_v4());
        order.add_item(Uuid::new_v4(), 1, money(100)).unwrap();
        order.checkout().unwrap();
        assert_eq!(order.status(), OrderStatus::Completed);
        assert_eq!(order.checkout(), Err(OrderError::AlreadyCompleted));
    }

    #[test]
    fn test_completed_order_rejects_mutation() {
        let mut order = Order::create(Uuid::new_v4());
        order.add_item(Uuid::new_v4(), 1, money(100)).unwrap();
        let item_id = order.items()[0].id;
        order.checkout().unwrap();
        assert_eq!(order.add_item(Uuid::new_v4(), 1, money(100)), Err(OrderError::AlreadyCompleted));
        assert_eq!(order.remove_item(item_id), Err(OrderError::AlreadyCompleted));
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total_amount(), money(100));
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!(OrderStatus::parse("open"), Some(OrderStatus::Open));
        assert_eq!(OrderStatus::parse(OrderStatus::Completed.as_str()), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
