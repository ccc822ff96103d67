//! Catalog management: admin-gated product CRUD and public reads.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{require_admin, AuthUser};
use crate::domain::product::Product;
use crate::domain::value_objects::Money;
use crate::error::Error;
use crate::events::{EventPublisher, ProductEvent};
use crate::repository::ProductStore;

/// Payload for creating a catalog entry. The image was already uploaded by
/// the time this service runs; only its URL and opaque blob reference
/// arrive here.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub image_ref: String,
}

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
    events: EventPublisher,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductStore>, events: EventPublisher) -> Self {
        Self { products, events }
    }

    #[tracing::instrument(skip(self, new), fields(caller = %caller.id))]
    pub async fn create(&self, caller: &AuthUser, new: NewProduct) -> Result<Product, Error> {
        require_admin(caller)?;
        if new.price.is_negative() {
            return Err(Error::validation("price must not be negative"));
        }
        let product = Product::create(
            caller.id,
            new.name,
            new.description,
            new.price,
            new.image_url,
            new.image_ref,
        );
        self.products.insert(&product).await?;
        tracing::info!(product_id = %product.id, "product added");
        self.events
            .publish(ProductEvent::Created { product_id: product.id, owner_id: caller.id })
            .await;
        Ok(product)
    }

    pub async fn list(&self) -> Result<Vec<Product>, Error> {
        Ok(self.products.list().await?)
    }

    pub async fn get(&self, product_id: Uuid) -> Result<Product, Error> {
        self.products
            .get(product_id)
            .await?
            .ok_or_else(|| Error::not_found("Product not found"))
    }

    pub async fn list_mine(&self, caller: &AuthUser) -> Result<Vec<Product>, Error> {
        require_admin(caller)?;
        Ok(self.products.list_for_owner(caller.id).await?)
    }

    /// Two-phase deletion: the catalog row goes first, then the blob
    /// cleanup request is published. Admin role is necessary but not
    /// sufficient; the product must also belong to the caller.
    #[tracing::instrument(skip(self), fields(caller = %caller.id, product_id = %product_id))]
    pub async fn delete(&self, caller: &AuthUser, product_id: Uuid) -> Result<(), Error> {
        require_admin(caller)?;
        let product = self
            .products
            .get(product_id)
            .await?
            .filter(|p| p.owner_id == caller.id)
            .ok_or_else(|| Error::not_found("Product not found or unauthorized"))?;
        let deleted = self.products.delete(product_id).await?;
        if deleted {
            tracing::info!(image_ref = %product.image_ref, "product deleted, image cleanup requested");
            self.events
                .publish(ProductEvent::Deleted { product_id, image_ref: product.image_ref })
                .await;
        }
        Ok(())
    }
}
