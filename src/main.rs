use be_there::{
    remote::RedisCounter,
    router,
    vote::tracker_for,
    AppState, Config, FileRecord, StateStore,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;

    let record = FileRecord::new(&config.data_path);
    record.ensure_exists().await?;
    let mut store = StateStore::new(Arc::new(record));

    if let Some(url) = config.redis_url.as_deref() {
        match RedisCounter::connect(url, config.redis_key.as_str(), config.remote_timeout).await {
            Ok(counter) => {
                info!("using remote counter key {}", config.redis_key);
                store = store.with_remote(Arc::new(counter), config.remote_timeout);
            }
            Err(err) => warn!("remote store unavailable, using local file only: {err}"),
        }
    }

    info!(
        data_path = %config.data_path.display(),
        remote = store.has_remote(),
        strategy = %config.vote_strategy,
        "state store ready"
    );

    let state = AppState::new(
        store,
        tracker_for(config.vote_strategy),
        &config.admin_password,
    );
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
