// rca-gateway-rs/src/handlers.rs
// Axum handlers. Bodies are read as bytes and parsed here so malformed JSON
// gets the same error shape as every other failure.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use case_store::{Ticket, TicketForm};
use once_cell::sync::Lazy;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Instant;
use tracing::instrument;

use crate::error::{ErrorBody, GatewayError};
use crate::prediction::{CaseLookupRequest, PredictionRequest, PredictionResponse, SimilarCasesResponse};
use crate::session::session_cookie;
use crate::turn::TurnRequest;
use crate::{AppState, SERVICE_NAME};

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Pin the uptime origin; called once at startup.
pub fn mark_started() {
    Lazy::force(&START_TIME);
}

type HandlerResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: i64,
    pub status: String,
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidJson(e.to_string()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        service_name: SERVICE_NAME.to_string(),
        uptime_seconds: START_TIME.elapsed().as_secs() as i64,
        status: "SERVING".to_string(),
    })
}

pub async fn rca_turn(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let session = state.sessions.resolve(session_cookie(&headers));

    let result = match parse_body::<TurnRequest>(&body) {
        Ok(request) => state.turns.handle(&session.session_id, request).await,
        Err(err) => Err(err),
    };

    let mut response = match result {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => err.to_response(&state.errors).into_response(),
    };

    if session.issued {
        match HeaderValue::from_str(&session.set_cookie()) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "session cookie not representable as a header"),
        }
    }
    response
}

async fn lookup_request(state: &AppState, body: &Bytes) -> Result<PredictionRequest, GatewayError> {
    let request: CaseLookupRequest = parse_body(body)?;
    let description = request.search_text();
    let new_case = state.cases.preview(request.form);
    let historical_cases = state.cases.history(state.history_limit).await?;

    Ok(PredictionRequest {
        description,
        new_case,
        historical_cases,
    })
}

#[instrument(skip_all)]
pub async fn predict_case(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<Json<PredictionResponse>> {
    let result = async {
        let request = lookup_request(&state, &body).await?;
        Ok::<_, GatewayError>(state.backend.predict(request).await?)
    }
    .await;

    result.map(Json).map_err(|e| e.to_response(&state.errors))
}

#[instrument(skip_all)]
pub async fn similar_cases(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<Json<SimilarCasesResponse>> {
    let result = async {
        let request = lookup_request(&state, &body).await?;
        Ok::<_, GatewayError>(state.backend.similar_cases(request).await?)
    }
    .await;

    result.map(Json).map_err(|e| e.to_response(&state.errors))
}

pub async fn create_case(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<(StatusCode, Json<Ticket>)> {
    let result = async {
        let form: TicketForm = parse_body(&body)?;
        Ok::<_, GatewayError>(state.cases.create_case(form).await?)
    }
    .await;

    result
        .map(|ticket| (StatusCode::CREATED, Json(ticket)))
        .map_err(|e| e.to_response(&state.errors))
}

pub async fn edit_case(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> HandlerResult<Json<Ticket>> {
    let result = async {
        let form: TicketForm = parse_body(&body)?;
        Ok::<_, GatewayError>(state.cases.edit_case(id, form).await?)
    }
    .await;

    result.map(Json).map_err(|e| e.to_response(&state.errors))
}

pub async fn get_case(State(state): State<AppState>, Path(id): Path<i64>) -> HandlerResult<Json<Ticket>> {
    state
        .cases
        .view_case(id)
        .await
        .map(Json)
        .map_err(|e| GatewayError::from(e).to_response(&state.errors))
}
