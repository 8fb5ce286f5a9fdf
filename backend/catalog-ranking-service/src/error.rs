/// Error types for the catalog ranking service
///
/// Every failure a handler can observe is one of these variants. Storage
/// failures are logged with their detail and answered with a generic message.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Caller supplied a value outside the accepted domain
    #[error("{0}")]
    InvalidArgument(String),

    /// The aggregate store could not be reached or the query failed
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A storage call exceeded its deadline
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message safe to return to clients
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Unavailable(_) => "Storage temporarily unavailable".to_string(),
            AppError::Timeout(_) => "Storage request timed out".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                AppError::Timeout("acquiring a database connection".to_string())
            }
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            other => AppError::Unavailable(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unavailable(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        }

        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error: self.public_message(),
        })
    }
}
