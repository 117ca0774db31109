use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post, MethodRouter},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::constants::{
    DATA_ROUTE, HEALTH_ROUTE, INGEST_ROUTE, METRICS_ROUTE, RECORD_ROUTE, TEST_ROUTE,
    WEBHOOK_ROUTE,
};
use crate::error::Result;
use crate::handlers;
use crate::state::AppState;

/// Create the HTTP router with all routes
pub fn create_server(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    // Known paths hit with the wrong method answer 405 in the JSON error shape
    let ingest = || -> MethodRouter<AppState> {
        post(handlers::ingest).fallback(handlers::method_not_allowed)
    };
    let query = || -> MethodRouter<AppState> {
        get(handlers::query).fallback(handlers::method_not_allowed)
    };

    Router::new()
        .route(INGEST_ROUTE, ingest())
        .route(WEBHOOK_ROUTE, ingest())
        .route(TEST_ROUTE, query())
        .route(DATA_ROUTE, query())
        .route(
            RECORD_ROUTE,
            get(handlers::get_record).fallback(handlers::method_not_allowed),
        )
        .route(
            HEALTH_ROUTE,
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .route(
            METRICS_ROUTE,
            get(handlers::render_metrics).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
///
/// Peer addresses are exposed to handlers through `ConnectInfo`.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(state: AppState, config: &Config) -> Result<()> {
    let addr = config.socket_addr()?;
    let app = create_server(state, config.server.max_body_bytes);
    let listener = TcpListener::bind(addr).await?;

    let port = listener.local_addr()?.port();
    println!("🚀 Webhook sink running on http://{addr}");
    println!("📥 Ingest (POST):  http://127.0.0.1:{port}/webhook");
    println!("📋 Records (GET):  http://127.0.0.1:{port}/data");
    println!("💚 Health check:   http://127.0.0.1:{port}/health");

    info!(%addr, policy = ?config.ingest.non_json_policy, "Server listening");
    serve(listener, app, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
