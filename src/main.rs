use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use card_backend::config::Config;
use card_backend::logging::{init_tracing, LogConfig};
use card_backend::routes::build_router;
use card_backend::services::starter_catalog::StarterContent;
use card_backend::services::starter_content::StarterContentService;
use card_backend::state::AppState;
use card_backend::store::Store;
use card_backend::workers::session_reaper::SessionReaper;
use card_backend::workers::WorkerManager;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!("Starting card-backend");

    let store = Arc::new(Store::open(&config.sled_path).expect("Failed to open sled database"));
    store.run_migrations().expect("Failed to run migrations");

    let starter_content = StarterContent::load(config.starter_content_path.as_deref())
        .expect("Failed to load starter content");
    tracing::info!(
        entries = starter_content.entries.len(),
        cards = starter_content.total_cards(),
        deck_size = starter_content.deck_size,
        "Starter content loaded"
    );
    let starter = Arc::new(StarterContentService::new(
        store.clone(),
        Arc::new(starter_content),
    ));

    let reaper = Arc::new(SessionReaper::new(
        store.clone(),
        config.worker.session_reaper_interval(),
    ));

    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(
        store.clone(),
        starter,
        reaper.clone(),
        &config,
        shutdown_tx.clone(),
    );

    let worker_manager = WorkerManager::new(reaper, state.shutdown_rx(), &config.worker);
    let worker_handle = tokio::spawn(worker_manager.run());

    let app = build_router(state)
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()))
        .await
    {
        tracing::error!(error = %e, "HTTP server crashed");
        let _ = shutdown_tx.send(());
    }

    // Lets an in-flight reaper pass finish before the store is flushed.
    if let Err(e) = worker_handle.await {
        tracing::error!(error = %e, "Worker task panicked");
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    tracing::info!("Shutdown complete");
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_methods(Any);

    if config.cors_origin.trim() == "*" {
        return base.allow_origin(Any);
    }

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => base.allow_origin(origin),
        Err(e) => panic!(
            "Invalid CORS_ORIGIN '{}': {}. Fix the CORS_ORIGIN environment variable.",
            config.cors_origin, e
        ),
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
