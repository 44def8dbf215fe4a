use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Native sharing is not supported on this device")]
    CapabilityAbsent,

    #[error("Failed to capture image: {0}")]
    RasterizationFailure(String),

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Sign in required")]
    AuthRequired,

    #[error("Data store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Too many requests, retry in {0}s")]
    RateLimited(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::CapabilityAbsent => "Sharing is not supported on this device or browser.",
            Self::RasterizationFailure(_) => "Could not create the image. Please try again.",
            Self::AuthFailure(_) => "That code didn't work. Check it and try again.",
            Self::AuthRequired => "Sign in to save and vote.",
            Self::RemoteUnavailable(_) => "Creations are unavailable right now. Try again later.",
            Self::InvalidInput(_) => "Some of the details you entered are not valid.",
            Self::NotFound => "Nothing here.",
            Self::RateLimited(_) => "Slow down a little and try again soon.",
            Self::Internal(_) => "Something went wrong on our side. Try again later.",
        }
    }
}

#[cfg(feature = "ssr")]
mod ssr_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
        notice: String,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::CapabilityAbsent => StatusCode::NOT_IMPLEMENTED,
                AppError::RasterizationFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
                AppError::AuthFailure(_) => StatusCode::UNAUTHORIZED,
                AppError::AuthRequired => StatusCode::UNAUTHORIZED,
                AppError::RemoteUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AppError::NotFound => StatusCode::NOT_FOUND,
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            let body = ErrorResponse {
                message: self.to_string(),
                notice: self.user_message().to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_detail() {
        let err = AppError::RasterizationFailure("surface has zero width".to_string());
        assert_eq!(err.to_string(), "Failed to capture image: surface has zero width");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&AppError::RateLimited(30)).unwrap();
        assert_eq!(json, r#"{"RateLimited":30}"#);
    }
}
