use axum::{
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use crate::{AppState, error::AppError, middleware::ClientIp, utils::success_to_api_response};

use super::model::{CreateBridgeRequest, CreateBridgeResponse, RedeemBridgeQuery};

#[axum::debug_handler]
pub async fn create_bridge(
    State(state): State<AppState>,
    ip: ClientIp,
    body: Result<Json<CreateBridgeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;

    let payload = req.into_payload().map_err(|missing| {
        AppError::Validation(format!("Missing required fields: {}", missing.join(", ")))
    })?;

    let issued = state.bridge.issue(ip.as_str(), payload).await?;

    Ok(success_to_api_response(
        StatusCode::CREATED,
        CreateBridgeResponse {
            bridge_token: issued.token,
            expires_in: issued.expires_in_seconds,
        },
    ))
}

#[axum::debug_handler]
pub async fn redeem_bridge(
    State(state): State<AppState>,
    ip: ClientIp,
    query: Result<Query<RedeemBridgeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;

    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing bridge token".to_string()))?;

    let payload = state.bridge.redeem(ip.as_str(), token.trim()).await?;

    Ok(success_to_api_response(StatusCode::OK, payload))
}
