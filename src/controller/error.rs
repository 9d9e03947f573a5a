use failure::Error as FailureError;
use hyper::header::ContentType;
use hyper::{Response, StatusCode};
use serde_json;

use super::utils::response_with_body;
use errors::{error_kind, Codeable};

/// Body of every error response, regardless of the negotiated format
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorMessage {
    pub code: u16,
    pub description: String,
    pub payload: Option<serde_json::Value>,
}

impl<'a> From<&'a FailureError> for ErrorMessage {
    fn from(err: &'a FailureError) -> Self {
        match error_kind(err) {
            Some(kind) => ErrorMessage {
                code: kind.code().as_u16(),
                description: kind.to_string(),
                payload: kind.payload(),
            },
            None => ErrorMessage {
                code: StatusCode::InternalServerError.as_u16(),
                description: "Internal server error".to_string(),
                payload: None,
            },
        }
    }
}

/// Converts an error to the http answer
pub fn error_response(err: &FailureError) -> Response {
    let status = error_kind(err).map(|kind| kind.code()).unwrap_or(StatusCode::InternalServerError);
    let message = ErrorMessage::from(err);
    let body = serde_json::to_string(&message).unwrap_or_else(|_| r#"{"code":500,"description":"Internal server error","payload":null}"#.to_string());
    response_with_body(status, ContentType::json(), body)
}
