//! City Comfort Service — Binary Entrypoint
//! Loads configuration, wires the aggregation pipeline and boots the Axum router.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs. `RUST_LOG` wins over the built-in filter.
///
/// Uses `try_init` because the runtime may already have installed a
/// global subscriber; in that case this is a no-op.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("city_comfort=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = city_comfort::AppConfig::load()?;
    let router = city_comfort::app(config).await?;

    Ok(router.into())
}
