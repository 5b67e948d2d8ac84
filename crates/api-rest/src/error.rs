use api_shared::upload_error_message;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use relay_core::{TransferError, ValidationError};

/// Failure of an upload request.
///
/// Every variant is rendered as a plain-text body of the form `Error uploading file: <cause>`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request itself is unusable: not multipart, no `file` part, or an unsafe name.
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Transfer(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Transfer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Transfer(TransferError::InvalidName(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The engine has already logged transfer failures with their stage.
        match &self {
            ApiError::BadRequest(_) => tracing::debug!("Client error: {}", self),
            ApiError::Transfer(e) if e.is_client_error() => tracing::debug!("Client error: {}", e),
            ApiError::Transfer(_) => {}
        }

        (self.status_code(), upload_error_message(&self)).into_response()
    }
}
