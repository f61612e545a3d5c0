use thiserror::Error;

/// Database outcomes the application reacts to, separated from driver
/// failures it cannot.
///
/// Constraint violations come back as typed variants rather than a caught
/// generic fault, so callers match on them directly (a duplicate username or
/// license plate is [`DbError::UniqueViolation`]).
#[derive(Error, Debug)]
pub enum DbError {
    #[error("row not found")]
    NotFound,

    #[error("unique constraint violated: {message}")]
    UniqueViolation {
        /// Constraint name, when the driver reports one
        constraint: Option<String>,
        message: String,
    },

    #[error("foreign key constraint violated: {message}")]
    ForeignKeyViolation { message: String },

    /// Anything the caller cannot recover from
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return DbError::NotFound;
        }

        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DbError::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_owned),
                    message: db_err.message().to_owned(),
                };
            }
            if db_err.is_foreign_key_violation() {
                return DbError::ForeignKeyViolation {
                    message: db_err.message().to_owned(),
                };
            }
        }

        DbError::Other(err.into())
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
