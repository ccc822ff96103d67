//! sqlx-backed stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::aggregates::{LineItem, Order, OrderStatus};
use crate::domain::product::Product;
use crate::domain::value_objects::{Money, Quantity};

use super::{OrderRepository, ProductStore, RepositoryError};

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    owner_id: Uuid,
    status: String,
    total_amount: Decimal,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
}

fn item_from_row(row: ItemRow) -> Result<LineItem, RepositoryError> {
    let quantity = u32::try_from(row.quantity)
        .ok()
        .and_then(Quantity::new)
        .ok_or(RepositoryError::Corrupt("order item with non-positive quantity"))?;
    Ok(LineItem {
        id: row.id,
        product_id: row.product_id,
        quantity,
        unit_price: Money::new(row.unit_price),
    })
}

fn order_from_rows(row: OrderRow, item_rows: Vec<ItemRow>) -> Result<Order, RepositoryError> {
    let status = OrderStatus::parse(&row.status)
        .ok_or(RepositoryError::Corrupt("unknown order status"))?;
    let items = item_rows
        .into_iter()
        .map(item_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Order::restore(
        row.id,
        row.owner_id,
        items,
        Money::new(row.total_amount),
        status,
        row.version,
        row.created_at,
        row.updated_at,
    ))
}

async fn insert_items(tx: &mut Transaction<'_, Postgres>, order: &Order) -> Result<(), RepositoryError> {
    for item in order.items() {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(item.id)
        .bind(order.id())
        .bind(item.product_id)
        .bind(item.quantity.value() as i32)
        .bind(item.unit_price.amount())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO orders (id, owner_id, status, total_amount, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id())
        .bind(order.owner_id())
        .bind(order.status().as_str())
        .bind(order.total_amount().amount())
        .bind(order.version())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&mut *tx)
        .await?;
        insert_items(&mut tx, order).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_for_owner(&self, order_id: Uuid, owner_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND owner_id = $2")
                .bind(order_id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(row) = row else { return Ok(None) };
        let items: Vec<ItemRow> = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        order_from_rows(row, items).map(Some)
    }

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        // Version check gives per-order atomicity: two concurrent
        // read-modify-write cycles cannot both commit against the same
        // loaded state.
        let result = sqlx::query(
            "UPDATE orders SET status = $2, total_amount = $3, version = $4, updated_at = $5 \
             WHERE id = $1 AND version = $6",
        )
        .bind(order.id())
        .bind(order.status().as_str())
        .bind(order.total_amount().amount())
        .bind(order.version() + 1)
        .bind(order.updated_at())
        .bind(order.version())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict);
        }
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id())
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, order).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as("SELECT * FROM orders WHERE owner_id = $1 ORDER BY created_at DESC")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
        let item_rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT i.* FROM order_items i JOIN orders o ON o.id = i.order_id WHERE o.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        let mut by_order: HashMap<Uuid, Vec<ItemRow>> = HashMap::new();
        for item in item_rows {
            by_order.entry(item.order_id).or_default().push(item);
        }
        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                order_from_rows(row, items)
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    image_ref: String,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            price: Money::new(row.price),
            image_url: row.image_url,
            image_ref: row.image_ref,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO products (id, owner_id, name, description, price, image_url, image_ref, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(product.id)
        .bind(product.owner_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(&product.image_url)
        .bind(&product.image_ref)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, product_id: Uuid) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as("SELECT * FROM products ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as("SELECT * FROM products WHERE owner_id = $1 ORDER BY created_at DESC")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete(&self, product_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
