//! Catalog product record.
//!
//! Read-only from the order core's perspective: orders copy the price into
//! a line-item snapshot at add time and never look back. Image bytes live
//! in external blob storage; the record carries only the display URL and an
//! opaque reference used for cleanup.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn create(
        owner_id: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        image_url: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            description: description.into(),
            price,
            image_url: image_url.into(),
            image_ref: image_ref.into(),
            created_at: Utc::now(),
        }
    }
}
