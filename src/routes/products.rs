//! Catalog endpoints. Reads are public; mutation is admin-gated.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::domain::product::Product;
use crate::domain::value_objects::Money;
use crate::error::Error;
use crate::service::NewProduct;

use super::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1))]
    pub image_url: String,
    #[validate(length(min = 1))]
    pub image_ref: String,
}

/// GET /products — public catalog listing.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, Error> {
    Ok(Json(state.catalog.list().await?))
}

/// GET /products/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, Error> {
    Ok(Json(state.catalog.get(id).await?))
}

/// GET /products/mine — the admin caller's own catalog entries.
pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Product>>, Error> {
    Ok(Json(state.catalog.list_mine(&user).await?))
}

/// POST /products — add a catalog entry (admin only).
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), Error> {
    req.validate()?;
    let product = state
        .catalog
        .create(
            &user,
            NewProduct {
                name: req.name,
                description: req.description,
                price: Money::new(req.price),
                image_url: req.image_url,
                image_ref: req.image_ref,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// DELETE /products/:id — admin + owner; blob cleanup happens after the
/// row is gone and never blocks the response.
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Error> {
    state.catalog.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
