use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use shelf_backend::BackendError;
use shelf_types::AuthErrorCode;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: Option<String>,
    pub message: String,
}

/// Backend failure rendered as a JSON error body.
#[derive(Debug)]
pub struct ApiError(pub BackendError);

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        Self(err)
    }
}

impl From<AuthErrorCode> for ApiError {
    fn from(code: AuthErrorCode) -> Self {
        Self(BackendError::Auth(code))
    }
}

fn auth_status(code: AuthErrorCode) -> StatusCode {
    match code {
        AuthErrorCode::EmailAlreadyInUse => StatusCode::CONFLICT,
        AuthErrorCode::UserNotFound | AuthErrorCode::WrongPassword => StatusCode::UNAUTHORIZED,
        AuthErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        AuthErrorCode::ProviderDisabled => StatusCode::FORBIDDEN,
        AuthErrorCode::InvalidEmail
        | AuthErrorCode::WeakPassword
        | AuthErrorCode::PopupClosedByUser
        | AuthErrorCode::Unknown => StatusCode::BAD_REQUEST,
    }
}

/// Text shown to the user for a backend failure.
pub fn user_message(err: &BackendError) -> String {
    match err {
        BackendError::Auth(code) => code.message().to_string(),
        BackendError::Validation(e) => e.to_string(),
        BackendError::NotFound(_) => "Book not found".to_string(),
        BackendError::PermissionDenied => "You can only change your own books".to_string(),
        BackendError::Io(_) | BackendError::Serialization(_) => {
            AuthErrorCode::Unknown.message().to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, code) = match &self.0 {
            BackendError::Auth(code) => (auth_status(*code), "auth", Some(code.code().to_string())),
            BackendError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", None),
            BackendError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            BackendError::PermissionDenied => (StatusCode::FORBIDDEN, "forbidden", None),
            BackendError::Io(_) | BackendError::Serialization(_) => {
                tracing::error!("backend failure: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", None)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.into(),
                code,
                message: user_message(&self.0),
            }),
        )
            .into_response()
    }
}
