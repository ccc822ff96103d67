//! Order endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::domain::aggregates::Order;
use crate::error::Error;
use crate::service::NewOrderItem;

use super::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    // Accepted for wire compatibility; the server derives its own total.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub status: String,
    pub items: Vec<LineItemResponse>,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            owner_id: order.owner_id(),
            status: order.status().as_str().to_string(),
            items: order
                .items()
                .iter()
                .map(|i| LineItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity.value(),
                    unit_price: i.unit_price.amount(),
                    line_total: i.line_total().amount(),
                })
                .collect(),
            total_amount: order.total_amount().amount(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

// -- Handlers --

/// POST /orders — place a new order from submitted items.
pub async fn place(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), Error> {
    if req.total_amount.is_some() {
        tracing::debug!("ignoring client-supplied total, deriving server-side");
    }
    let items: Vec<NewOrderItem> = req
        .items
        .iter()
        .map(|i| NewOrderItem { product_id: i.product_id, quantity: i.quantity })
        .collect();
    let order = state.orders.place(user.id, &items).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /orders/history — every order of the caller, newest first.
pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OrderResponse>>, Error> {
    let orders = state.orders.history(user.id).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// POST /orders/:id/items — add a product to an open order.
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<OrderResponse>, Error> {
    let order = state
        .orders
        .add_item(user.id, order_id, req.product_id, req.quantity)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /orders/:id/items/:item_id — remove one line item.
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((order_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OrderResponse>, Error> {
    let order = state.orders.remove_item(user.id, order_id, item_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/checkout — complete the order.
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, Error> {
    let order = state.orders.checkout(user.id, order_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}
