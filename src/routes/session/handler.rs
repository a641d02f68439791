use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState, cache::SessionCacheOperations, config::MAX_TTL_SECS, error::AppError,
    utils::success_to_api_response,
};

use super::model::{
    CacheStatusResponse, DeleteSessionResponse, GetSessionResponse, SessionAction,
    SessionCacheRequest, SetSessionResponse,
};

#[axum::debug_handler]
pub async fn session_cache(
    State(state): State<AppState>,
    body: Result<Json<SessionCacheRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = body?;

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing sessionId".to_string()))?;

    let action = req
        .action
        .as_deref()
        .and_then(SessionAction::parse)
        .ok_or_else(|| {
            AppError::Validation("Invalid action, expected get, set or delete".to_string())
        })?;

    let response = match action {
        SessionAction::Get => {
            let session = SessionCacheOperations::get_session(&state.cache, &session_id).await;
            success_to_api_response(
                StatusCode::OK,
                GetSessionResponse {
                    found: session.is_some(),
                    data: session.map(|s| s.data),
                },
            )
            .into_response()
        }
        SessionAction::Set => {
            let data = req
                .session_data
                .ok_or_else(|| AppError::Validation("Missing sessionData".to_string()))?;
            let ttl = req.ttl.unwrap_or(state.config.session_ttl_secs);
            if ttl == 0 {
                return Err(AppError::Validation("ttl must be greater than zero".to_string()));
            }
            if ttl > MAX_TTL_SECS {
                return Err(AppError::Validation(format!(
                    "ttl must not exceed {MAX_TTL_SECS} seconds"
                )));
            }

            let remote = SessionCacheOperations::cache_session(
                &state.cache,
                state.clock.as_ref(),
                &session_id,
                data,
                ttl,
            )
            .await;
            tracing::debug!(session_id = %session_id, remote, ttl, "Cached session");

            success_to_api_response(
                StatusCode::OK,
                SetSessionResponse {
                    stored: true,
                    remote,
                    ttl,
                },
            )
            .into_response()
        }
        SessionAction::Delete => {
            SessionCacheOperations::remove_session(&state.cache, &session_id).await;
            success_to_api_response(StatusCode::OK, DeleteSessionResponse { deleted: true })
                .into_response()
        }
    };

    Ok(response)
}

#[axum::debug_handler]
pub async fn cache_status(State(state): State<AppState>) -> impl IntoResponse {
    // 先探测一次远程，连接状态才是最新的
    state.cache.ping_remote().await;
    let stats = state.cache.stats();

    success_to_api_response(
        StatusCode::OK,
        CacheStatusResponse {
            backend: stats.backend,
            connected: stats.remote_connected,
            memory_cache_size: stats.local_entries,
            timestamp: state.clock.now().timestamp(),
        },
    )
}
