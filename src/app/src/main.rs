use std::sync::Arc;

use crypto_dashboard_app::{routes, AppError, CoinGeckoClient, Config, Dashboard, RefreshTimer};
use tokio::main;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crypto_dashboard_app=info,tower_http=warn")),
        )
        .with_target(true)
        .init();

    if let Err(e) = run().await {
        error!("dashboard stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    info!(
        "starting dashboard for {:?}, default {}, refreshing every {:?}",
        config.assets, config.default_asset, config.refresh_interval
    );

    let dashboard = Arc::new(Dashboard::new(
        CoinGeckoClient::with_base_url(&config.api_base_url),
        config.assets.clone(),
        config.default_asset.clone(),
    ));

    let refreshing = dashboard.clone();
    let timer = RefreshTimer::start(config.refresh_interval, move || {
        let dashboard = refreshing.clone();
        async move {
            dashboard.refresh().await;
        }
    })
    .await?;

    let app = routes::router(dashboard);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;

    timer.stop().await
}
