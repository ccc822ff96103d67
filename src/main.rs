//! Storefront - catalog and ordering backend.

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::config::Config;
use storefront::events::EventPublisher;
use storefront::repository::{PgOrderRepository, PgProductStore};
use storefront::routes::{self, AppState};
use storefront::service::{CatalogService, OrderService};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "could not reach NATS, events disabled");
                None
            }
        },
        None => None,
    };
    let events = EventPublisher::new(nats);

    let order_repo = Arc::new(PgOrderRepository::new(db.clone()));
    let product_store = Arc::new(PgProductStore::new(db));
    let state = AppState {
        orders: OrderService::new(order_repo, product_store.clone(), events.clone()),
        catalog: CatalogService::new(product_store, events),
    };

    let app = routes::router(state);
    tracing::info!("storefront listening on {}", config.addr());
    axum::serve(tokio::net::TcpListener::bind(config.addr()).await?, app).await?;
    Ok(())
}
