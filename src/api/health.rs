use axum::{extract::State, Json};
use serde::Serialize;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub rpc: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // A blockhash fetch is the cheapest call that proves the RPC node answers.
    let rpc_status = if state.checkin.ledger().latest_blockhash().await.is_ok() {
        "connected".to_string()
    } else {
        "disconnected".to_string()
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rpc: rpc_status,
    })
}
