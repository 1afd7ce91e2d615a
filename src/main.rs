//! OpenSASE Logistics - Self-hosted delivery order and freight service

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opensase_logistics::config::AppConfig;
use opensase_logistics::http::{router, AppState};
use opensase_logistics::integrations::{build_http_client, GoogleDistanceMatrix, ViaCep};
use opensase_logistics::messaging::{EventPublisher, NatsEventPublisher, TracingEventPublisher};
use opensase_logistics::repository::{MemoryOrderRepository, OrderRepository, PgOrderRepository};
use opensase_logistics::service::{Catalog, OrderService};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = AppConfig::from_env()?;

    let repository: Arc<dyn OrderRepository> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(10).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            Arc::new(PgOrderRepository::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory");
            Arc::new(MemoryOrderRepository::new())
        }
    };

    let events: Arc<dyn EventPublisher> = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Arc::new(NatsEventPublisher::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, order events go to the log");
                Arc::new(TracingEventPublisher)
            }
        },
        None => Arc::new(TracingEventPublisher),
    };

    let client = build_http_client(&config.http)?;
    if config.google_maps_api_key.is_none() { tracing::warn!("GOOGLE_MAPS_API_KEY not set, freight pricing will fail"); }
    let distances = GoogleDistanceMatrix::new(client.clone(), config.google_maps_api_key.clone().unwrap_or_default(), config.retry.clone());
    let mut addresses = ViaCep::new(client, config.retry.clone());
    if let Some(url) = &config.viacep_url { addresses = addresses.with_base_url(url.clone()); }

    let orders = OrderService::new(repository, Arc::new(distances), Arc::new(addresses), events, config.orders.clone());
    let catalog = Catalog::embedded()?;
    let app = router(AppState { orders: Arc::new(orders), catalog: Arc::new(catalog) });

    tracing::info!("🚀 OpenSASE Logistics listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
