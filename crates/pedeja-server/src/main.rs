mod api;
mod middleware;
mod poller;
mod scheduler;
mod session;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use pedeja_geo::{CepClient, DeliveryFeeResolver, GeocoderClient, SettingsClient};
use pedeja_orders::OrdersClient;

use crate::api::{build_app, AppState};
use crate::session::{AdminKeys, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(pedeja_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cep = CepClient::with_base_url(
        config.http_timeout_secs,
        &config.user_agent,
        &config.cep_base_url,
    )?;
    let geocoder = GeocoderClient::with_base_url(
        config.http_timeout_secs,
        &config.user_agent,
        &config.geocoder_base_url,
    )?;
    let resolver = Arc::new(DeliveryFeeResolver::new(
        cep,
        geocoder,
        config.geofence_enforcement,
    ));
    let settings = Arc::new(SettingsClient::new(
        &config.upstream_base_url,
        config.http_timeout_secs,
        &config.user_agent,
    )?);
    let orders = Arc::new(OrdersClient::new(
        &config.upstream_base_url,
        config.http_timeout_secs,
        &config.user_agent,
    )?);

    let sessions = SessionStore::new(config.session_ttl_secs);
    let admin_keys = AdminKeys::from_env(matches!(
        config.env,
        pedeja_core::Environment::Development
    ))?;
    let dashboards: api::Dashboards = Arc::new(Mutex::new(HashMap::new()));

    let _poller = poller::spawn(
        Arc::clone(&orders),
        Arc::clone(&dashboards),
        sessions.clone(),
        config.poll_interval_ms,
    );
    let _scheduler = scheduler::build_scheduler(sessions.clone()).await?;

    let app = build_app(AppState {
        config: Arc::clone(&config),
        resolver,
        settings,
        orders,
        dashboards,
        sessions,
        admin_keys,
    });

    tracing::info!(addr = %config.bind_addr, env = %config.env, "pedeja server starting");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
