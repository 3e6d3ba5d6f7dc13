use axum::{
    body::Bytes,
    extract::{Query, RawQuery, State},
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use url::form_urlencoded;

use crate::{
    config::Config,
    constants::found_location_message,
    error::{AppError, Result},
    models::{
        CheckInBody, CheckInQuery, CheckInResponse, ReferenceQuery, ReferenceStatusResponse,
        ServiceDescriptor,
    },
    utils::{non_empty, parse_pubkey},
};

use super::AppState;

/// GET|POST /api/checkin
///
/// Solana Pay transaction request endpoint. GET describes the service, POST
/// returns the check-in transaction for the wallet to countersign.
pub async fn handle_checkin(
    State(state): State<AppState>,
    method: Method,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Result<Response> {
    match method {
        Method::GET => Ok(Json(describe_service(&state.config)).into_response()),
        Method::POST => {
            let query = parse_query(raw_query.as_deref());
            check_in(&state, query, &body).await.map(IntoResponse::into_response)
        }
        _ => Err(AppError::MethodNotAllowed),
    }
}

pub fn describe_service(config: &Config) -> ServiceDescriptor {
    ServiceDescriptor {
        label: config.service_label.clone(),
        icon: config.service_icon_url.clone(),
    }
}

async fn check_in(state: &AppState, query: CheckInQuery, body: &[u8]) -> Result<Json<CheckInResponse>> {
    // Unreadable bodies are treated like a body without `account`.
    let body: CheckInBody = serde_json::from_slice(body).unwrap_or_default();

    let (Some(account), Some(reference), Some(id)) = (
        non_empty(body.account),
        non_empty(query.reference),
        non_empty(query.id),
    ) else {
        return Err(AppError::MissingParameter);
    };

    let account = parse_pubkey(&account)?;
    let reference = parse_pubkey(&reference)?;

    tracing::info!("Check-in request from {} for location {}", account, id);

    let built = state
        .checkin
        .build_check_in_transaction(&account, &reference, &id)
        .await
        .inspect_err(|e| {
            if e.is_user_facing() {
                tracing::info!("Check-in rejected for {}: {}", account, e);
            }
        })?;

    Ok(Json(CheckInResponse::accepted(
        built.transaction,
        found_location_message(built.location.index),
    )))
}

/// First occurrence wins; repeated or unknown keys are ignored.
fn parse_query(raw: Option<&str>) -> CheckInQuery {
    let mut query = CheckInQuery::default();
    for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "reference" if query.reference.is_none() => query.reference = Some(value.into_owned()),
            "id" if query.id.is_none() => query.id = Some(value.into_owned()),
            _ => {}
        }
    }
    query
}

/// GET /api/checkin/status?reference=<key>
///
/// Lets the page that displayed the QR code learn when the wallet submitted.
pub async fn reference_status(
    State(state): State<AppState>,
    Query(query): Query<ReferenceQuery>,
) -> Result<Json<ReferenceStatusResponse>> {
    let raw = non_empty(query.reference).ok_or(AppError::MissingParameter)?;
    let reference = parse_pubkey(&raw)?;

    let found = state.checkin.ledger().find_reference(&reference).await?;
    Ok(Json(match found {
        Some(found) => ReferenceStatusResponse {
            reference: reference.to_string(),
            found: true,
            signature: Some(found.signature),
            succeeded: found.succeeded,
            block_time: found.block_time,
        },
        None => ReferenceStatusResponse {
            reference: reference.to_string(),
            found: false,
            signature: None,
            succeeded: false,
            block_time: None,
        },
    }))
}
