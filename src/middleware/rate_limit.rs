use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::rate_limit::Admission;
use crate::state::AppState;

/// Admits or rejects the request against the caller's token bucket
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.limiter.config().enabled {
        return Ok(next.run(request).await);
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = client_identity(request.headers(), peer, state.config.api.trust_proxy);

    match state.limiter.admit(&identity) {
        Admission::Allowed => Ok(next.run(request).await),
        Admission::Limited => {
            tracing::warn!("Rate limit exceeded for {}", identity);
            Err(ApiError::TooManyRequests)
        }
    }
}

/// First `X-Forwarded-For` hop when proxies are trusted, else the peer IP
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());
        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
