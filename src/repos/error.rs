//! Classification of database errors into catalog error kinds
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use failure::{Error as FailureError, Fail};

use errors::Error;

/// Attaches `on_unique` to unique violations and `on_foreign_key` to foreign
/// key violations, other errors are passed through as they are.
pub fn constraint_error(err: DieselError, on_unique: Error, on_foreign_key: Error) -> FailureError {
    let kind = match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => Some(on_unique),
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => Some(on_foreign_key),
        _ => None,
    };
    match kind {
        Some(kind) => err.context(kind).into(),
        None => err.into(),
    }
}
