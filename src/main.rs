use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use guardia_core::config::{locality_from_env_value, store_kind_from_env_value};
use guardia_core::{CoreConfig, DEFAULT_DATA_DIR, StoreKind, Stores};

/// Main entry point for the guardia admission service
///
/// Serves the REST API (with Swagger UI at `/swagger-ui`) over the configured stores.
///
/// # Environment Variables
/// - `GUARDIA_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `GUARDIA_STORE`: `memory` or `file` (default: "memory")
/// - `GUARDIA_DATA_DIR`: Root of the file store (default: "guardia_data")
/// - `GUARDIA_DEFAULT_LOCALITY`: Locality recorded on placeholder patients
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("guardia_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("GUARDIA_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;

    let data_dir = std::env::var("GUARDIA_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let store = store_kind_from_env_value(std::env::var("GUARDIA_STORE").ok(), StoreKind::Memory)?;
    let locality = locality_from_env_value(std::env::var("GUARDIA_DEFAULT_LOCALITY").ok());
    let cfg = Arc::new(CoreConfig::new(PathBuf::from(data_dir), store, locality));

    let stores = Stores::from_config(&cfg)?;
    let state = AppState::new(cfg.clone(), &stores)?;

    tracing::info!("++ Starting guardia REST on {} ({:?} store)", rest_addr, cfg.store());

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
