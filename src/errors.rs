use failure::{Context, Error as FailureError, Fail};
use hyper::StatusCode;
use serde_json;
use validator::ValidationErrors;

/// Error kinds of the catalog. Lower layers attach them as a `failure` context,
/// the controller looks them up in the cause chain.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Not found")]
    NotFound,
    #[fail(display = "Parse error")]
    Parse,
    #[fail(display = "Validation error: {}", _0)]
    Validate(ValidationErrors),
    #[fail(display = "Root category already exists")]
    RootAlreadyExists,
    #[fail(display = "Only the root category can have level 0")]
    RootLevelConflict,
    #[fail(display = "Category can not become the root category")]
    CannotBecomeRoot,
    #[fail(display = "Category can not be moved under itself or its subcategory")]
    CategoryCycle,
    #[fail(display = "Name is already in use")]
    DuplicateName,
    #[fail(display = "Same goods already exist")]
    DuplicateGoods,
    #[fail(display = "Referenced category or producer does not exist")]
    UnknownReference,
    #[fail(display = "Entity is referenced by other entities")]
    ReferentialConflict,
    #[fail(display = "Content type of the request is not supported")]
    UnsupportedMediaType,
    #[fail(display = "Requested response format is not supported")]
    NotAcceptable,
    #[fail(display = "Server is refusing to fullfil the request")]
    Connection,
}

pub trait Codeable {
    fn code(&self) -> StatusCode;
}

impl Codeable for Error {
    fn code(&self) -> StatusCode {
        match *self {
            Error::NotFound => StatusCode::NotFound,
            Error::Parse
            | Error::Validate(_)
            | Error::RootAlreadyExists
            | Error::RootLevelConflict
            | Error::CannotBecomeRoot
            | Error::CategoryCycle
            | Error::DuplicateName
            | Error::DuplicateGoods
            | Error::UnknownReference => StatusCode::BadRequest,
            Error::NotAcceptable => StatusCode::NotAcceptable,
            Error::UnsupportedMediaType => StatusCode::UnsupportedMediaType,
            Error::ReferentialConflict | Error::Connection => StatusCode::InternalServerError,
        }
    }
}

impl Error {
    /// Validation details that go to the response payload
    pub fn payload(&self) -> Option<serde_json::Value> {
        match *self {
            Error::Validate(ref errors) => serde_json::to_value(errors).ok(),
            _ => None,
        }
    }
}

/// Finds the first error kind in the cause chain of `err`
pub fn error_kind(err: &FailureError) -> Option<&Error> {
    for cause in err.iter_chain() {
        if let Some(context) = cause.downcast_ref::<Context<Error>>() {
            return Some(context.get_context());
        }
        if let Some(kind) = cause.downcast_ref::<Error>() {
            return Some(kind);
        }
    }
    None
}

/// Renders the cause chain as `outer: inner: root`
pub fn print_chain(err: &FailureError) -> String {
    err.iter_chain().map(|cause| cause.to_string()).collect::<Vec<String>>().join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_is_found_under_contexts() {
        let err: FailureError = format_err!("Category with id 7 not found").context(Error::NotFound).into();
        let err: FailureError = err.context("Service categories, get_category endpoint error occurred.").into();
        let kind = error_kind(&err).map(|kind| kind.code());
        assert_eq!(kind, Some(StatusCode::NotFound));
    }

    #[test]
    fn error_without_kind_has_none() {
        let err: FailureError = format_err!("connection reset");
        assert!(error_kind(&err).is_none());
    }

    #[test]
    fn referential_conflict_is_internal_error() {
        assert_eq!(Error::ReferentialConflict.code(), StatusCode::InternalServerError);
        assert_eq!(Error::RootAlreadyExists.code(), StatusCode::BadRequest);
        assert_eq!(Error::UnsupportedMediaType.code(), StatusCode::UnsupportedMediaType);
        assert_eq!(Error::NotAcceptable.code(), StatusCode::NotAcceptable);
    }
}
