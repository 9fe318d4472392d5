//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type returned by every handler,
//! extractor and middleware in the service.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so returning it from a handler
//! produces a JSON body of the form `{"detail": "<message>"}` with the matching status code.
//! `From` conversions exist for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error` and `bcrypt::BcryptError` so the `?` operator works
//! across all of them.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or expired credentials (HTTP 401).
    Unauthorized(String),
    /// The request is well-formed but cannot be honoured, e.g. a duplicate email (HTTP 400).
    BadRequest(String),
    /// The resource does not exist or is not owned by the requester (HTTP 404).
    NotFound(String),
    /// An unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// A failure reported by the database driver (HTTP 500).
    /// The message is logged but not sent to the client.
    DatabaseError(String),
    /// The payload, query string or path failed validation (HTTP 422).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl AppError {
    /// The message exposed to the client in the `detail` field.
    fn detail(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::DatabaseError(_) => "Internal server error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized(_) = self {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(json!({ "detail": self.detail() }))
    }
}

/// `RowNotFound` becomes `NotFound`; everything else is logged and hidden behind a 500.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => {
                log::error!("Database error: {}", error);
                AppError::DatabaseError(error.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
