use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::guard::bearer_token;
use crate::auth::{AuthGuard, Principal};
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the caller from the `Authorization` header and injects the
/// resulting `Principal` into request extensions.
///
/// Requests without a credential continue as anonymous; whether that is
/// acceptable is decided per route by `require_permission`.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Owned so no borrow of the request is held across the lookup
    let token = {
        let header_value = request
            .headers()
            .get(header::AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| ApiError::InvalidCredential))
            .transpose()?;
        bearer_token(header_value)?.map(str::to_owned)
    };

    let principal = state.guard.authenticate(token.as_deref()).await?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Route layer rejecting callers that lack `permission`
pub async fn require_permission(
    permission: &'static str,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let outcome = match request.extensions().get::<Principal>() {
        Some(principal) => AuthGuard::authorize(principal, permission),
        None => AuthGuard::authorize(&Principal::anonymous(), permission),
    };

    if let Err(err) = outcome {
        tracing::debug!("Denied {} on {}: {}", permission, request.uri().path(), err);
        return Err(err.into());
    }
    Ok(next.run(request).await)
}
