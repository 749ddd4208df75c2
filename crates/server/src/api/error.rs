use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use registrar_api_types::ErrorResponse;
use tracing::error;

use crate::error::{ErrorKind, RegistrarError};

/// Error returned by every handler; rendered as an [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError {
    message: String,
    code: &'static str,
    status: StatusCode,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<RegistrarError> for ApiError {
    fn from(err: RegistrarError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if kind == ErrorKind::Internal {
            error!(error = %err, "request failed");
            "internal server error".to_string()
        } else {
            err.to_string()
        };

        Self {
            message,
            code: kind.code(),
            status,
        }
    }
}

impl From<registrar_core::domain::DomainError> for ApiError {
    fn from(err: registrar_core::domain::DomainError) -> Self {
        RegistrarError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            code: self.code.to_string(),
            message: self.message,
        });
        let mut response = (self.status, body).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use crate::error::RegistrarError;
    use axum::http::StatusCode;

    #[test]
    fn test_status_follows_error_kind() {
        let cases = [
            (RegistrarError::not_found("course", "X"), StatusCode::NOT_FOUND),
            (RegistrarError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (RegistrarError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (RegistrarError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (RegistrarError::Constraint("dup".into()), StatusCode::CONFLICT),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = ApiError::from(RegistrarError::Internal(anyhow::anyhow!("disk on fire")));

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }
}
