use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use papertrade_core::errors::{DatabaseError, Error as CoreError, TradingError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(error: &CoreError) -> StatusCode {
    match error {
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
        CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Trading(e) => match e {
            TradingError::PortfolioNotFound(_) | TradingError::StockNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            TradingError::QuoteUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TradingError::InvalidQuantity(_)
            | TradingError::NoPosition(_)
            | TradingError::InsufficientFunds { .. }
            | TradingError::InsufficientShares { .. } => StatusCode::BAD_REQUEST,
        },
        CoreError::MarketData(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::DuplicateSnapshot { .. } => StatusCode::CONFLICT,
        CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason.clone()),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        match err {
            crate::auth::AuthError::Unauthorized => {
                ApiError::Unauthorized("Unauthorized".to_string())
            }
            crate::auth::AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid username or password".to_string())
            }
            crate::auth::AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
