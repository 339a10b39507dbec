use std::net::SocketAddr;

use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use signalement_sync::config::Config;
use signalement_sync::{connectivity, db, worker};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting Signalement sync agent");

    let pool = db::connect(&config.database_url).await?;
    tracing::info!("Offline queue ready at {}", config.database_url);

    let addr = SocketAddr::new(config.host, config.port);
    let (app, state) = signalement_sync::build_app(pool, config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let prober = tokio::spawn(connectivity::run(
        state.connectivity.clone(),
        shutdown_rx.clone(),
    ));
    let sync = tokio::spawn(worker::run(state.clone(), shutdown_rx));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = prober.await;
    let _ = sync.await;

    tracing::info!("Sync agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
