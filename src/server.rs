//! API server setup

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::create_router;
use crate::config::AppConfig;
use crate::db::Store;
use crate::state::AppState;

pub fn create_server(config: &AppConfig, store: Arc<dyn Store>) -> Result<(Router, SocketAddr)> {
    let state = AppState::new(store, config.fallbacks.clone(), config.store_backend);

    let mut router = create_router(state).layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let addr: SocketAddr = addr.parse()?;

    Ok((router, addr))
}

pub async fn run_server(config: AppConfig, store: Arc<dyn Store>) -> Result<()> {
    let (router, addr) = create_server(&config, store)?;

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}
