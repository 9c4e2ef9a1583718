// HTTP API error types
use std::collections::HashMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::validator::ValidationErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    InvalidCredential,
    AuthenticationRequired,

    // 403 Forbidden
    InactiveAccount,
    Forbidden,

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 409 Conflict
    EditConflict,

    // 422 Unprocessable Entity
    ValidationError {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 429 Too Many Requests
    TooManyRequests,

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredential | ApiError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ApiError::InactiveAccount | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::EditConflict => StatusCode::CONFLICT,
            ApiError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidCredential => "invalid or missing authentication token",
            ApiError::AuthenticationRequired => "you must be authenticated to access this resource",
            ApiError::InactiveAccount => "your user account must be activated to access this resource",
            ApiError::Forbidden => "your user account doesn't have the necessary permissions to access this resource",
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::EditConflict => "unable to update the record due to an edit conflict, please try again",
            ApiError::ValidationError { message, .. } => message,
            ApiError::TooManyRequests => "rate limit exceeded",
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidCredential => "INVALID_CREDENTIAL",
            ApiError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            ApiError::InactiveAccount => "INACTIVE_ACCOUNT",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::EditConflict => "EDIT_CONFLICT",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::TooManyRequests => "TOO_MANY_REQUESTS",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });
        if let ApiError::ValidationError { field_errors, .. } = self {
            body["field_errors"] = json!(field_errors);
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("the requested resource could not be found".to_string())
    }

    pub fn method_not_allowed(method: &Method) -> Self {
        ApiError::MethodNotAllowed(format!("the {} method is not supported for this resource", method))
    }

    pub fn internal_server_error() -> Self {
        ApiError::InternalServerError(
            "the server encountered a problem and could not process your request".to_string(),
        )
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        tracing::debug!("Rejected request: {}", err);
        ApiError::ValidationError {
            message: "request failed validation".to_string(),
            field_errors: err.fields,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::not_found(),
            StoreError::EditConflict => ApiError::EditConflict,
            StoreError::Timeout(after) => {
                tracing::error!("Storage operation timed out after {:?}", after);
                ApiError::internal_server_error()
            }
            StoreError::Database(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredential => ApiError::InvalidCredential,
            AuthError::AuthenticationRequired => ApiError::AuthenticationRequired,
            AuthError::InactiveAccount => ApiError::InactiveAccount,
            AuthError::Forbidden => ApiError::Forbidden,
            AuthError::Store(store_err) => store_err.into(),
            other @ (AuthError::TokenGeneration(_) | AuthError::InvalidSecret) => {
                tracing::error!("Auth configuration error: {}", other);
                ApiError::internal_server_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected JSON body: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(self.to_json())).into_response();
        if self.status_code() == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(ApiError::from(StoreError::NotFound).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(StoreError::EditConflict).status_code(), StatusCode::CONFLICT);

        let timeout = ApiError::from(StoreError::Timeout(Duration::from_secs(3)));
        assert_eq!(timeout.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!timeout.message().contains("3s"));

        let sqlx = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(sqlx.error_code(), "INTERNAL_SERVER_ERROR");
        assert!(!sqlx.message().to_lowercase().contains("pool"));
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::InvalidCredential, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIAL"),
            (AuthError::AuthenticationRequired, StatusCode::UNAUTHORIZED, "AUTHENTICATION_REQUIRED"),
            (AuthError::InactiveAccount, StatusCode::FORBIDDEN, "INACTIVE_ACCOUNT"),
            (AuthError::Forbidden, StatusCode::FORBIDDEN, "FORBIDDEN"),
        ];
        for (err, status, code) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status_code(), status);
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn validation_body_carries_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("page_size".to_string(), "must be greater than zero".to_string());
        let api = ApiError::from(ValidationErrors { fields });

        let body = api.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["page_size"], "must be greater than zero");
    }

    #[test]
    fn method_not_allowed_names_the_method() {
        let api = ApiError::method_not_allowed(&Method::PUT);
        assert_eq!(api.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(api.error_code(), "METHOD_NOT_ALLOWED");
        assert_eq!(api.message(), "the PUT method is not supported for this resource");
    }

    #[test]
    fn unauthorized_responses_advertise_bearer() {
        let response = ApiError::AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

        let response = ApiError::Forbidden.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
