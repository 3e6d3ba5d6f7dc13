use axum::{
    extract::{Path, State},
    Json,
};
use solana_sdk::signature::{Keypair, Signer};

use crate::{
    error::{AppError, Result},
    models::{LocationView, PaymentRequestResponse},
    utils::{checkin_link, solana_pay_url},
};

use super::AppState;

/// GET /api/locations
pub async fn list_locations(State(state): State<AppState>) -> Result<Json<Vec<LocationView>>> {
    let base_url = state.config.base_url();
    let locations = state
        .checkin
        .registry()
        .all()
        .iter()
        .map(|location| {
            let link = checkin_link(&base_url, location.index, None)?;
            Ok(LocationView {
                index: location.index,
                key: location.key.to_string(),
                link: solana_pay_url(&link),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(locations))
}

/// GET /api/locations/{id}/payment-request
///
/// Issues a fresh reference key so the QR code can later be matched to the
/// submitted transaction.
pub async fn payment_request(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<PaymentRequestResponse>> {
    let location = state
        .checkin
        .registry()
        .by_index(id)
        .ok_or_else(|| AppError::NotFound(format!("Location {} does not exist", id)))?;

    let reference = Keypair::new().pubkey();
    let link = checkin_link(&state.config.base_url(), location.index, Some(&reference))?;

    Ok(Json(PaymentRequestResponse {
        index: location.index,
        reference: reference.to_string(),
        url: solana_pay_url(&link),
    }))
}
