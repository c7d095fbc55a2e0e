use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::proxy::{exchange_hh_code, forward, ForwardRequest, HhTokenRequest};
use crate::state::AppState;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// GET|POST|PUT|DELETE /proxy/hh_api/*path
pub async fn handle_hh_api(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    // axum and reqwest depend on different `http` majors.
    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|_| AppError::Validation(format!("unsupported method {method}")))?;

    let reply = forward(
        &state.http,
        &state.config.hh_api_base,
        ForwardRequest {
            method,
            path: &path,
            query: query.as_deref(),
            authorization: header(&headers, "authorization"),
            user_agent: header(&headers, "hh-user-agent"),
            body: body.to_vec(),
        },
    )
    .await?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok(match reply.body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    })
}

/// POST /proxy/hh_oauth/oauth/token
pub async fn handle_hh_token(
    State(state): State<AppState>,
    Json(req): Json<HhTokenRequest>,
) -> Result<Json<Value>, AppError> {
    let tokens = exchange_hh_code(&state.http, &state.config.hh_oauth_base, &req).await?;
    Ok(Json(tokens))
}
