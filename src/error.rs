//! Error types for the SQLite CRUD façade.

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the store.
///
/// Uniqueness conflicts on insert are not represented here: they are
/// recovered inside [`crate::SqliteStore::insert`] and reported as
/// [`crate::InsertOutcome::Skipped`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Driver error, propagated unmodified.
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    /// Table or column name that is not a plain SQL identifier.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Column type declaration that cannot be embedded in CREATE TABLE.
    #[error("Invalid type declaration for column {column}: {declaration:?}")]
    InvalidDeclaration { column: String, declaration: String },

    /// Update or delete issued without any condition.
    #[error("{operation} on {table} requires at least one condition; use {operation}_all to affect every row")]
    EmptyConditions {
        operation: &'static str,
        table: String,
    },

    /// Insert, update or create_table issued without any column.
    #[error("{operation} on {table} requires at least one column")]
    EmptyRecord {
        operation: &'static str,
        table: String,
    },

    /// The connection could not be released cleanly.
    #[error("Failed to close database: {0}")]
    Close(rusqlite::Error),
}

impl Error {
    /// True if the error is a PRIMARY KEY or UNIQUE constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Db(err) => is_unique_violation(err),
            _ => false,
        }
    }
}

/// True if a driver error is a PRIMARY KEY or UNIQUE constraint violation.
///
/// Other constraint failures (NOT NULL, CHECK, FOREIGN KEY) return false.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _) => {
            sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation
                && matches!(
                    sqlite_err.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                )
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn constraint(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code,
            },
            None,
        )
    }

    #[test]
    fn test_primary_key_is_unique_violation() {
        assert!(is_unique_violation(&constraint(ffi::SQLITE_CONSTRAINT_PRIMARYKEY)));
    }

    #[test]
    fn test_unique_is_unique_violation() {
        assert!(Error::from(constraint(ffi::SQLITE_CONSTRAINT_UNIQUE)).is_unique_violation());
    }

    #[test]
    fn test_not_null_is_not_unique_violation() {
        assert!(!is_unique_violation(&constraint(ffi::SQLITE_CONSTRAINT_NOTNULL)));
        assert!(!is_unique_violation(&rusqlite::Error::QueryReturnedNoRows));
    }

    #[test]
    fn test_empty_conditions_message() {
        let err = Error::EmptyConditions {
            operation: "delete",
            table: "employees".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "delete on employees requires at least one condition; use delete_all to affect every row"
        );
    }
}
