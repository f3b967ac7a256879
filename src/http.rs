//! HTTP boundary adapter: render a [`ServiceError`] as a JSON error
//! response.
//!
//! Framework-agnostic on purpose: [`respond`] returns an
//! `http::Response<String>` any tower-style stack can adapt. The body follows
//! the google.rpc JSON convention:
//!
//! ```json
//! {
//!   "error": {
//!     "code": 404,
//!     "message": "requested resource not found",
//!     "status": "NOT_FOUND",
//!     "details": [
//!       { "@type": "type.googleapis.com/google.rpc.ResourceInfo", ... }
//!     ]
//!   }
//! }
//! ```
//!
//! Like the RPC adapter, this is a redaction choke point: a hidden error has
//! its sensitive detail groups stripped (and zeroized) before the body is
//! assembled.

use ::http::header::{HeaderValue, CONTENT_TYPE};
use ::http::{Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::details::DetailGroup;
use crate::{Fault, ServiceError};

const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorPayload<'a>,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    code: u16,
    message: &'a str,
    status: &'static str,
    details: Vec<Value>,
}

/// Render an error as a JSON response, applying redaction.
///
/// The status line comes from [`Code::http_status`](crate::Code::http_status)
/// (including the non-standard 499 for cancellation). If the body cannot be
/// serialized the response degrades to a plain-text 500; that path is not
/// reachable for the types this crate defines, but a broken response is
/// worse than a plain one.
pub fn respond(err: ServiceError) -> Response<String> {
    let err = if err.is_details_hidden() {
        err.remove_sensitive_details()
    } else {
        err
    };
    let status = StatusCode::from_u16(err.code().http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = detail_values(&err).and_then(|details| {
        serde_json::to_string(&ErrorBody {
            error: ErrorPayload {
                code: err.code().http_status(),
                message: err.message(),
                status: err.code().name(),
                details,
            },
        })
    });
    match body {
        Ok(body) => {
            let mut response = Response::new(body);
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(_) => {
            let mut response = Response::new("failed to write error response".to_owned());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            response
        }
    }
}

/// Render a [`Fault`]. A classified error anywhere under the context layers
/// goes through [`respond`]; an opaque fault yields a bare 500 with an empty
/// body, leaking nothing (context messages included).
pub fn respond_fault(fault: Fault) -> Response<String> {
    if fault.service().is_some() {
        respond(fault.into_service())
    } else {
        let mut response = Response::new(String::new());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    }
}

fn detail_values(err: &ServiceError) -> Result<Vec<Value>, serde_json::Error> {
    let mut out = Vec::new();
    for group in err.detail_groups() {
        match group {
            DetailGroup::BadRequest(violations) => {
                let mut map = Map::new();
                map.insert("fieldViolations".to_owned(), serde_json::to_value(violations)?);
                out.push(tagged(map, "google.rpc.BadRequest"));
            }
            DetailGroup::PreconditionFailure(violations) => {
                let mut map = Map::new();
                map.insert("violations".to_owned(), serde_json::to_value(violations)?);
                out.push(tagged(map, "google.rpc.PreconditionFailure"));
            }
            DetailGroup::ErrorInfo(info) => {
                out.push(tagged_value(serde_json::to_value(info)?, "google.rpc.ErrorInfo"));
            }
            DetailGroup::QuotaFailure(violations) => {
                let mut map = Map::new();
                map.insert("violations".to_owned(), serde_json::to_value(violations)?);
                out.push(tagged(map, "google.rpc.QuotaFailure"));
            }
            // Single-valued on the wire: one object per descriptor.
            DetailGroup::ResourceInfo(infos) => {
                for info in infos {
                    out.push(tagged_value(
                        serde_json::to_value(info)?,
                        "google.rpc.ResourceInfo",
                    ));
                }
            }
            DetailGroup::DebugInfo(info) => {
                out.push(tagged_value(serde_json::to_value(info)?, "google.rpc.DebugInfo"));
            }
        }
    }
    Ok(out)
}

fn tagged(mut map: Map<String, Value>, type_name: &str) -> Value {
    map.insert(
        "@type".to_owned(),
        Value::String(format!("{TYPE_URL_PREFIX}{type_name}")),
    );
    Value::Object(map)
}

fn tagged_value(value: Value, type_name: &str) -> Value {
    match value {
        Value::Object(map) => tagged(map, type_name),
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
