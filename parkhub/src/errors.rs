//! Application error type and its HTTP rendering.
//!
//! Domain outcomes the user can act on (duplicate username, invalid
//! credentials, duplicate plate, car not in the list) never reach this type;
//! the route handlers recover them into flash messages. What remains here is
//! the session gate rejection, the ownership check denial, and failures the
//! user cannot fix.

use crate::db::errors::DbError;
use crate::types::{Operation, Resource};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// No active session
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// The ownership capability check denied the operation
    #[error("Insufficient permissions to {action} {resource}")]
    InsufficientPermissions { action: Operation, resource: Resource },

    /// Malformed request data
    #[error("{message}")]
    BadRequest { message: String },

    /// The named resource does not exist
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// A service operation failed; `operation` names it for the log only
    #[error("Failed to {operation}")]
    Internal { operation: String },

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Database(DbError::NotFound) => StatusCode::NOT_FOUND,
            Error::Database(DbError::UniqueViolation { .. }) => StatusCode::CONFLICT,
            Error::Database(DbError::ForeignKeyViolation { .. }) => StatusCode::BAD_REQUEST,
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// A message safe to show the user; internal detail stays in the log.
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::InsufficientPermissions { action, resource } => format!("Insufficient permissions to {action} {resource}"),
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Database(DbError::NotFound) => "Resource not found".to_string(),
            Error::Database(DbError::UniqueViolation { .. }) => "Resource already exists".to_string(),
            Error::Database(DbError::ForeignKeyViolation { .. }) => "Invalid reference to related resource".to_string(),
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Log with severity matched to the class of failure.
    fn log(&self) {
        match self {
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InsufficientPermissions { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();

        // A browser is on the other end: a missing or expired session bounces
        // to the login form instead of surfacing a bare 401.
        if matches!(self, Error::Unauthenticated { .. }) {
            return Redirect::to("/login").into_response();
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_session_becomes_login_redirect() {
        let response = Error::Unauthenticated { message: None }.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[test]
    fn test_status_codes_by_class() {
        let denied = Error::InsufficientPermissions {
            action: Operation::Read,
            resource: Resource::Cars,
        };
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

        let duplicate = Error::Database(DbError::UniqueViolation {
            constraint: None,
            message: "cars.car_number".to_string(),
        });
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_detail_stays_out_of_the_response() {
        let err = Error::Internal {
            operation: "open /var/lib/parkhub/parking.db".to_string(),
        };
        assert_eq!(err.user_message(), "Internal server error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
