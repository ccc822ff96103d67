//! HTTP surface: router wiring and shared state.

pub mod health;
pub mod orders;
pub mod products;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::{CatalogService, OrderService};

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub catalog: CatalogService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/products", get(products::list).post(products::create))
        .route("/products/mine", get(products::list_mine))
        .route("/products/:id", get(products::get_by_id).delete(products::remove))
        .route("/orders", post(orders::place))
        .route("/orders/history", get(orders::history))
        .route("/orders/:id/items", post(orders::add_item))
        .route("/orders/:id/items/:item_id", axum::routing::delete(orders::remove_item))
        .route("/orders/:id/checkout", post(orders::checkout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
