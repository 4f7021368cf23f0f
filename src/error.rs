use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Boundary error type. Every authentication/authorization failure is mapped
/// here exactly once; internal detail stays in the logs and never reaches the
/// response body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing/malformed/expired bearer token, or a token whose subject no
    /// longer exists. `reason` is logged, never returned.
    #[error("Could not validate credentials")]
    Unauthenticated { reason: &'static str },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not enough permissions")]
    Forbidden,

    #[error("Invalid or expired token")]
    InvalidResetToken,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthenticated(reason: &'static str) -> Self {
        Self::Unauthenticated { reason }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated { .. } | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidResetToken | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Unauthenticated { reason } => warn!(reason, "authentication rejected"),
            AppError::Internal(source) => error!(error = %source, "internal error"),
            _ => {}
        }

        let status = self.status_code();
        let message = self.to_string();
        match self {
            AppError::Unauthenticated { .. } => {
                (status, [(header::WWW_AUTHENTICATE, "Bearer")], message).into_response()
            }
            _ => (status, message).into_response(),
        }
    }
}
