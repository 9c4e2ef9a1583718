use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for API responses that automatically adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub location: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            location: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
            location: None,
        }
    }

    /// 201 Created pointing at the new resource
    pub fn created(data: T, location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::with_status(data, StatusCode::CREATED)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "data": data_value
        });

        let mut response = (status, Json(envelope)).into_response();
        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(_) => tracing::warn!("Dropped unencodable Location header: {}", location),
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sets_status_and_location() {
        let response = ApiResponse::created(json!({"id": 1}), "/v1/puzzles/1").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/v1/puzzles/1");
    }

    #[test]
    fn success_defaults_to_ok_without_location() {
        let response = ApiResponse::success(json!({"message": "ok"})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::LOCATION).is_none());
    }
}
