//! Helpers for reading requests and writing responses
use std::borrow::Cow;
use std::collections::HashMap;
use std::str::FromStr;

use failure::Error as FailureError;
use failure::Fail;
use futures::{Future, Stream};
use hyper::header::{q, Accept, ContentLength, ContentType, Headers};
use hyper::mime::{self, Mime};
use hyper::{Body, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::ser::Serialize;
use serde_json;
use treexml::Document;
use url::form_urlencoded;
use validator::{ValidationError, ValidationErrors};

use super::xml::{FromXMLElement, ToXMLDocument, ToXMLElement};
use errors::Error;
use models::Ordering;

lazy_static! {
    static ref APPLICATION_XML: Mime = "application/xml".parse().unwrap_or(mime::TEXT_XML);
}

/// Wire format of request and response bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    fn from_mime(mime: &Mime) -> Option<Self> {
        if mime.type_() != mime::APPLICATION {
            return None;
        }
        if mime.subtype() == mime::JSON {
            Some(Format::Json)
        } else if mime.subtype() == mime::XML {
            Some(Format::Xml)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> ContentType {
        match *self {
            Format::Json => ContentType::json(),
            Format::Xml => ContentType(APPLICATION_XML.clone()),
        }
    }
}

/// Checks `Content-Type` first and `Accept` second, returns formats of the
/// request body and of the response body
pub fn negotiate_formats(headers: &Headers) -> Result<(Format, Format), FailureError> {
    let request_format = headers
        .get::<ContentType>()
        .and_then(|content_type| Format::from_mime(&content_type.0))
        .ok_or_else(|| -> FailureError {
            format_err!("Content-Type must be application/json or application/xml")
                .context(Error::UnsupportedMediaType)
                .into()
        })?;

    let response_format = headers
        .get::<Accept>()
        .and_then(|accept| preferred_format(accept))
        .ok_or_else(|| -> FailureError {
            format_err!("Accept must list application/json or application/xml")
                .context(Error::NotAcceptable)
                .into()
        })?;

    Ok((request_format, response_format))
}

/// Picks the supported format with the highest quality, earlier entries win
/// ties and entries with `q=0` are refused
fn preferred_format(accept: &Accept) -> Option<Format> {
    accept
        .iter()
        .enumerate()
        .filter(|&(_, item)| item.quality != q(0u16))
        .filter_map(|(position, item)| Format::from_mime(&item.item).map(|format| (position, item.quality, format)))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(_, _, format)| format)
}

/// Reads the whole body and decodes it according to `format`
pub fn parse_body<T>(body: Body, format: Format) -> Box<Future<Item = T, Error = FailureError>>
where
    T: DeserializeOwned + FromXMLElement + 'static,
{
    Box::new(
        body.concat2()
            .map_err(|e| -> FailureError { e.context(Error::Parse).into() })
            .and_then(move |chunk| match format {
                Format::Json => serde_json::from_slice::<T>(&chunk).map_err(|e| -> FailureError { e.context(Error::Parse).into() }),
                Format::Xml => Document::parse(&chunk[..])
                    .map_err(|e| -> FailureError { format_err!("Invalid xml: {}", e).context(Error::Parse).into() })
                    .and_then(|document| {
                        document.root.ok_or_else(|| -> FailureError {
                            format_err!("Xml document has no root element").context(Error::Parse).into()
                        })
                    })
                    .and_then(|root| T::from_xml(&root)),
            }),
    )
}

/// Decodes a query string into key-value pairs
pub fn parse_query(query: &str) -> HashMap<String, String> {
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

/// Reads optional typed query parameter, unparsable values are validation errors
pub fn query_param<T: FromStr>(params: &HashMap<String, String>, name: &'static str) -> Result<Option<T>, FailureError> {
    match params.get(name) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| {
            let mut errors = ValidationErrors::new();
            errors.add(
                name,
                ValidationError {
                    code: Cow::from("value"),
                    message: Some(Cow::from(format!("Invalid value of query parameter {}", name))),
                    params: HashMap::new(),
                },
            );
            format_err!("Query parameter {} has invalid value {}", name, value)
                .context(Error::Validate(errors))
                .into()
        }),
    }
}

/// Reads `sort` query parameter
pub fn sort_param(params: &HashMap<String, String>) -> Result<Option<Ordering>, FailureError> {
    match params.get("sort") {
        None => Ok(None),
        Some(value) => Ordering::from_query(value).map(Some).ok_or_else(|| {
            format_err!("Query parameter sort has invalid value {}", value)
                .context(Error::Validate(validation_errors!({"sort": ["sort" => "Sort must be asc or desc"]})))
                .into()
        }),
    }
}

/// Fails with `NotFound` on empty lists
pub fn non_empty<T>(items: Vec<T>, what: &str) -> Result<Vec<T>, FailureError> {
    if items.is_empty() {
        Err(format_err!("No {} found", what).context(Error::NotFound).into())
    } else {
        Ok(items)
    }
}

/// Fails with `NotFound` when an update or delete matched nothing
pub fn affected(found: bool, what: &str) -> Result<Response, FailureError> {
    if found {
        Ok(Response::new().with_status(StatusCode::NoContent))
    } else {
        Err(format_err!("{} not found", what).context(Error::NotFound).into())
    }
}

/// Encodes `value` in `format`
pub fn render<T>(status: StatusCode, format: Format, value: T) -> Result<Response, FailureError>
where
    T: Serialize + ToXMLElement,
{
    let body = match format {
        Format::Json => serde_json::to_string(&value)?,
        Format::Xml => value.to_xml_document().to_string(),
    };
    Ok(response_with_body(status, format.content_type(), body))
}

pub fn response_with_body(status: StatusCode, content_type: ContentType, body: String) -> Response {
    Response::new()
        .with_status(status)
        .with_header(content_type)
        .with_header(ContentLength(body.len() as u64))
        .with_body(body)
}
