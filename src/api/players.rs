use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::Result, models::ProgressResponse, utils::parse_pubkey};

use super::AppState;

/// GET /api/players/{account}/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Result<Json<ProgressResponse>> {
    let account = parse_pubkey(&account)?;
    let progress = state.checkin.progress(&account).await?;

    Ok(Json(ProgressResponse {
        account: account.to_string(),
        last_location: progress.last_location.map(|l| l.index),
        next_location: progress.next_location.map(|l| l.index),
        completed: progress.last_location.is_some() && progress.next_location.is_none(),
    }))
}
