// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Context;
use geree_api::app::{create_router, AppState, VERSION};
use geree_api::config::AppConfig;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let port = config.port;

    // All clients are wired here once; connections are established lazily on
    // the first request, so a temporarily unreachable index or database does
    // not prevent startup.
    let state = AppState::from_config(&config)?;
    let app = create_router(state);

    // Bind to 0.0.0.0 to accept connections from any network interface (required for Docker)
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(version = VERSION, %addr, "geree-api listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
