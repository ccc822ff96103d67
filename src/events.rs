//! Domain events published to the message bus.
//!
//! Publishing is best-effort: a failure is logged and never surfaced to the
//! caller. Product deletion relies on this channel to hand the image
//! reference to the external blob-cleanup worker.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Order(OrderEvent),
    Product(ProductEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: Uuid, owner_id: Uuid, total_amount: Decimal },
    CheckedOut { order_id: Uuid, owner_id: Uuid, total_amount: Decimal },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductEvent {
    Created { product_id: Uuid, owner_id: Uuid },
    /// Carries the blob reference so the image-cleanup worker can delete it.
    Deleted { product_id: Uuid, image_ref: String },
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(OrderEvent::Placed { .. }) => "orders.placed",
            Self::Order(OrderEvent::CheckedOut { .. }) => "orders.checked_out",
            Self::Product(ProductEvent::Created { .. }) => "products.created",
            Self::Product(ProductEvent::Deleted { .. }) => "products.deleted",
        }
    }
}

impl From<OrderEvent> for DomainEvent {
    fn from(e: OrderEvent) -> Self { Self::Order(e) }
}

impl From<ProductEvent> for DomainEvent {
    fn from(e: ProductEvent) -> Self { Self::Product(e) }
}

/// Fire-and-forget publisher over an optional NATS connection. Without a
/// connection events are dropped with a debug log, so the service runs
/// stand-alone in development and tests.
#[derive(Clone)]
pub struct EventPublisher {
    client: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(client: Option<async_nats::Client>) -> Self { Self { client } }

    pub fn disabled() -> Self { Self { client: None } }

    pub async fn publish(&self, event: impl Into<DomainEvent>) {
        let event = event.into();
        let subject = event.subject();
        let Some(client) = &self.client else {
            tracing::debug!(subject, "event bus not configured, dropping event");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(subject, error = %e, "failed to serialize event");
                return;
            }
        };
        if let Err(e) = client.publish(subject.to_string(), payload.into()).await {
            tracing::warn!(subject, error = %e, "failed to publish event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_shape() {
        let event: DomainEvent = ProductEvent::Deleted {
            product_id: Uuid::nil(),
            image_ref: "shop/abc123".into(),
        }
        .into();
        assert_eq!(event.subject(), "products.deleted");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "deleted");
        assert_eq!(json["image_ref"], "shop/abc123");
    }
}
