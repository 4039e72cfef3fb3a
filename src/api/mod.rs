//! HTTP surface: leaderboard reads and writes, wallet balance lookups.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::{ledger::AccountReader, service::ArcadeService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ArcadeService>,
    pub accounts: Arc<dyn AccountReader>,
}

impl AppState {
    pub fn new(service: Arc<ArcadeService>, accounts: Arc<dyn AccountReader>) -> Self {
        Self { service, accounts }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/leaderboard", get(handlers::get_leaderboard))
        .route("/api/leaderboard/submit", post(handlers::submit_score))
        .route("/api/wallet/:address/balance", get(handlers::wallet_balance))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await
}
