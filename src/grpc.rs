//! RPC boundary adapter: [`ServiceError`] to and from [`tonic::Status`].
//!
//! Outbound, [`into_status`] is the single choke point where the redaction
//! flag takes effect: a hidden error has its sensitive detail groups stripped
//! (and zeroized) before anything reaches the wire. Inbound, [`from_status`]
//! rebuilds a [`ServiceError`] best-effort from a rich status; detail kinds
//! this crate does not model (retry info, help links, ...) are ignored, and
//! severity is not carried over the wire, so decoded errors start
//! unspecified.
//!
//! Wrap unary handler results with [`intercept`] to get the boundary
//! behavior without repeating it per handler.

use tonic::Status;
use tonic_types::{ErrorDetail, StatusExt};
use tonic_types as pb;

use crate::codes::Code;
use crate::details::{
    BadRequestViolation, DetailGroup, PreconditionViolation, QuotaViolation, ResourceInfo,
};
use crate::{Fault, ServiceError};

/// Map a classification code onto the tonic taxonomy. Total: the sixteen
/// codes are a subset of tonic's (which adds `Ok`).
#[must_use]
pub const fn to_tonic_code(code: Code) -> tonic::Code {
    match code {
        Code::Cancelled => tonic::Code::Cancelled,
        Code::Unknown => tonic::Code::Unknown,
        Code::InvalidArgument => tonic::Code::InvalidArgument,
        Code::DeadlineExceeded => tonic::Code::DeadlineExceeded,
        Code::NotFound => tonic::Code::NotFound,
        Code::AlreadyExists => tonic::Code::AlreadyExists,
        Code::PermissionDenied => tonic::Code::PermissionDenied,
        Code::ResourceExhausted => tonic::Code::ResourceExhausted,
        Code::FailedPrecondition => tonic::Code::FailedPrecondition,
        Code::Aborted => tonic::Code::Aborted,
        Code::OutOfRange => tonic::Code::OutOfRange,
        Code::NotImplemented => tonic::Code::Unimplemented,
        Code::Internal => tonic::Code::Internal,
        Code::Unavailable => tonic::Code::Unavailable,
        Code::DataLoss => tonic::Code::DataLoss,
        Code::Unauthenticated => tonic::Code::Unauthenticated,
    }
}

/// Map a tonic code onto the classification taxonomy. `Ok` is not an error
/// and maps to `UNKNOWN`: a status that reaches the error path with code `Ok`
/// is itself an anomaly.
#[must_use]
pub const fn from_tonic_code(code: tonic::Code) -> Code {
    match code {
        tonic::Code::Ok | tonic::Code::Unknown => Code::Unknown,
        tonic::Code::Cancelled => Code::Cancelled,
        tonic::Code::InvalidArgument => Code::InvalidArgument,
        tonic::Code::DeadlineExceeded => Code::DeadlineExceeded,
        tonic::Code::NotFound => Code::NotFound,
        tonic::Code::AlreadyExists => Code::AlreadyExists,
        tonic::Code::PermissionDenied => Code::PermissionDenied,
        tonic::Code::ResourceExhausted => Code::ResourceExhausted,
        tonic::Code::FailedPrecondition => Code::FailedPrecondition,
        tonic::Code::Aborted => Code::Aborted,
        tonic::Code::OutOfRange => Code::OutOfRange,
        tonic::Code::Unimplemented => Code::NotImplemented,
        tonic::Code::Internal => Code::Internal,
        tonic::Code::Unavailable => Code::Unavailable,
        tonic::Code::DataLoss => Code::DataLoss,
        tonic::Code::Unauthenticated => Code::Unauthenticated,
    }
}

/// Render an error as a rich [`tonic::Status`], applying redaction.
///
/// A hidden error crosses the wire without its sensitive detail groups; the
/// stripped payloads are zeroized on the way out. Encoding itself cannot
/// fail: every detail group maps to a standard rich-status payload.
pub fn into_status(err: ServiceError) -> Status {
    let err = if err.is_details_hidden() {
        err.remove_sensitive_details()
    } else {
        err
    };
    let mut details = Vec::with_capacity(err.detail_groups().len());
    for group in err.detail_groups() {
        encode_group(group, &mut details);
    }
    Status::with_error_details_vec(to_tonic_code(err.code()), err.message(), details)
}

/// Rebuild a [`ServiceError`] from an inbound status, best-effort.
///
/// Details are replayed through the normal mutators, so the grouping
/// invariants hold for decoded errors exactly as for constructed ones.
#[must_use]
pub fn from_status(status: &Status) -> ServiceError {
    let mut err = ServiceError::new(from_tonic_code(status.code()), status.message());
    for detail in status.get_error_details_vec() {
        err = match detail {
            ErrorDetail::BadRequest(bad_request) => err.with_bad_request_violations(
                bad_request
                    .field_violations
                    .into_iter()
                    .map(|v| BadRequestViolation {
                        field: v.field,
                        description: v.description,
                    })
                    .collect(),
            ),
            ErrorDetail::PreconditionFailure(failure) => err.with_precondition_violations(
                failure
                    .violations
                    .into_iter()
                    .map(|v| PreconditionViolation {
                        subject: v.subject,
                        violation_type: v.r#type,
                        description: v.description,
                    })
                    .collect(),
            ),
            ErrorDetail::ErrorInfo(info) => {
                err.with_error_info(&info.domain, &info.reason, info.metadata)
            }
            ErrorDetail::QuotaFailure(failure) => err.with_quota_violations(
                failure
                    .violations
                    .into_iter()
                    .map(|v| QuotaViolation {
                        subject: v.subject,
                        description: v.description,
                    })
                    .collect(),
            ),
            ErrorDetail::ResourceInfo(info) => err.with_resource_infos(vec![ResourceInfo {
                resource_type: info.resource_type,
                resource_name: info.resource_name,
                owner: info.owner,
                description: info.description,
            }]),
            ErrorDetail::DebugInfo(info) => err.with_debug_info(info.detail, info.stack_entries),
            // Kinds this crate does not model.
            _ => err,
        };
    }
    err
}

/// Unary handler boundary: pass `Ok` through, render errors with redaction
/// applied.
pub fn intercept<T>(result: Result<T, ServiceError>) -> Result<T, Status> {
    result.map_err(into_status)
}

/// Render a [`Fault`] as a status. Opaque faults collapse to `UNKNOWN` with
/// hidden details, so nothing unclassified leaks payloads.
pub fn fault_to_status(fault: Fault) -> Status {
    into_status(fault.into_service())
}

fn encode_group(group: &DetailGroup, out: &mut Vec<ErrorDetail>) {
    match group {
        DetailGroup::BadRequest(violations) => {
            out.push(ErrorDetail::BadRequest(pb::BadRequest {
                field_violations: violations
                    .iter()
                    .map(|v| pb::FieldViolation {
                        field: v.field.clone(),
                        description: v.description.clone(),
                    })
                    .collect(),
            }));
        }
        DetailGroup::PreconditionFailure(violations) => {
            out.push(ErrorDetail::PreconditionFailure(pb::PreconditionFailure {
                violations: violations
                    .iter()
                    .map(|v| pb::PreconditionViolation {
                        r#type: v.violation_type.clone(),
                        subject: v.subject.clone(),
                        description: v.description.clone(),
                    })
                    .collect(),
            }));
        }
        DetailGroup::ErrorInfo(info) => {
            out.push(ErrorDetail::ErrorInfo(pb::ErrorInfo {
                reason: info.reason.clone(),
                domain: info.domain.clone(),
                metadata: info.metadata.clone().into_iter().collect(),
            }));
        }
        DetailGroup::QuotaFailure(violations) => {
            out.push(ErrorDetail::QuotaFailure(pb::QuotaFailure {
                violations: violations
                    .iter()
                    .map(|v| pb::QuotaViolation {
                        subject: v.subject.clone(),
                        description: v.description.clone(),
                    })
                    .collect(),
            }));
        }
        // The resource-info payload is single-valued on the wire; a group of
        // several becomes several payloads.
        DetailGroup::ResourceInfo(infos) => {
            out.extend(infos.iter().map(|info| {
                ErrorDetail::ResourceInfo(pb::ResourceInfo {
                    resource_type: info.resource_type.clone(),
                    resource_name: info.resource_name.clone(),
                    owner: info.owner.clone(),
                    description: info.description.clone(),
                })
            }));
        }
        DetailGroup::DebugInfo(info) => {
            out.push(ErrorDetail::DebugInfo(pb::DebugInfo {
                stack_entries: info.stack_entries.clone(),
                detail: info.detail.clone(),
            }));
        }
    }
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        into_status(err)
    }
}

impl From<Status> for ServiceError {
    fn from(status: Status) -> Self {
        from_status(&status)
    }
}

// ============================================================================
// Tests
// ============================================================================
