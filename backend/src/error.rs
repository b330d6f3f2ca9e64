use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use common::req::{ErrorList, ErrorMessage};
use log::error;

use crate::db::StorageError;

/// Everything a handler can fail with, mapped onto the json error envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid device: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Device not found")]
    NotFound,

    #[error("Failed to fetch devices")]
    Fetch(#[source] StorageError),

    #[error("Database error: {0}")]
    Store(#[source] StorageError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Fetch(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => HttpResponse::build(self.status_code()).json(ErrorList {
                errors: errors.clone(),
            }),
            ApiError::Fetch(e) | ApiError::Store(e) => {
                error!("{self} ({e})");
                HttpResponse::build(self.status_code()).json(ErrorMessage {
                    error: self.to_string(),
                })
            }
            ApiError::BadRequest(_) | ApiError::NotFound => {
                HttpResponse::build(self.status_code()).json(ErrorMessage {
                    error: self.to_string(),
                })
            }
        }
    }
}
