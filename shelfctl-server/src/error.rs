//! Error types for shelfctl-server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Domain and infrastructure errors raised by the record access layer.
///
/// The `InsufficientCopies` and `InvalidBookData` kinds are reserved for
/// future checks (borrow limits, payload validation) and are not raised
/// by any current operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Faculty not found: {0}")]
    FacultyNotFound(String),

    #[error("Duplicate book: {0}")]
    DuplicateBook(String),

    #[error("Duplicate branch: {0}")]
    DuplicateBranch(String),

    #[error("Duplicate faculty: {0}")]
    DuplicateFaculty(String),

    #[error("Insufficient copies: {0}")]
    InsufficientCopies(String),

    #[error("Invalid book data: {0}")]
    InvalidBookData(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BookNotFound(_) | Error::BranchNotFound(_) | Error::FacultyNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::DuplicateBook(_)
            | Error::DuplicateBranch(_)
            | Error::DuplicateFaculty(_)
            | Error::InsufficientCopies(_)
            | Error::InvalidBookData(_) => StatusCode::BAD_REQUEST,
            Error::Database(_) | Error::Addr(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Error::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            Error::Addr(e) => {
                tracing::error!("Invalid bind address: {}", e);
                "Internal server error".to_string()
            }
            Error::Io(e) => {
                tracing::error!("IO error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "message": message }));

        (status, body).into_response()
    }
}
