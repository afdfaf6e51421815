use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::Sse;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, info};
use serde::Deserialize;
use serde_json::{json, Value};

use super::sse::{accepts_event_stream, data_frame, heartbeat, EVENT_STREAM};
use super::AppState;
use crate::alerts::{check_price_alert, PriceQuery};
use crate::api::prices::supported_coins;
use crate::mcp::dispatch::SERVER_NAME;

#[derive(Debug, Deserialize)]
pub(super) struct PriceAlertParams {
    coin: String,
    target_price: f64,
}

pub(super) async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Crypto Price Alert API",
        "price_source": state.source.name(),
        "endpoints": {
            "price_alert": "/price-alert?coin=bitcoin&target_price=1000000",
            "health": "/health",
            "mcp": "/mcp"
        },
        "supported_coins": supported_coins()
    }))
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVER_NAME }))
}

pub(super) async fn price_alert(
    State(state): State<AppState>,
    params: Result<Query<PriceAlertParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => return unprocessable(rejection.body_text()),
    };
    let query = match PriceQuery::new(&params.coin, params.target_price) {
        Ok(q) => q,
        Err(e) => return unprocessable(e.to_string()),
    };

    info!("price-alert {} >= {}", query.coin, query.target_price);
    Json(check_price_alert(&state.source, &query).await).into_response()
}

fn unprocessable(detail: String) -> Response {
    debug!("Rejected price-alert query: {}", detail);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": detail })),
    )
        .into_response()
}

pub(super) async fn mcp_rpc(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let raw = String::from_utf8_lossy(&body);
    let response = state.mcp.handle_message(&raw).await;
    let status = if response.is_framing_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    let payload = match serde_json::to_string(&response) {
        Ok(p) => p,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    if accepts_event_stream(&headers) {
        (status, [(CONTENT_TYPE, EVENT_STREAM)], data_frame(&payload)).into_response()
    } else {
        (status, [(CONTENT_TYPE, "application/json")], payload).into_response()
    }
}

pub(super) async fn mcp_stream(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !accepts_event_stream(&headers) {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    info!("Opening heartbeat stream");
    Sse::new(heartbeat(state.heartbeat_interval)).into_response()
}
