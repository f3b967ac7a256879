//! Constructor factory: one function per failure situation.
//!
//! Every constructor stamps the canonical classification code, message,
//! default severity and redaction flag for its situation, and attaches the
//! detail payload the situation calls for. Picking the constructor *is* the
//! classification decision; [`crate::guide`] walks the decision tree when the
//! right one is not obvious.
//!
//! Constructors whose situation carries a structured cause (aborted,
//! resource exhausted, unauthenticated, permission denied, request data loss)
//! take a source error plus a `(reason, metadata)` pair and attach an
//! [`ErrorInfo`](crate::ErrorInfo). The free functions stamp the process-wide
//! default domain set by [`init`]; [`ErrorFactory`] carries an explicit
//! domain instead, which is the preferred form for anything but small
//! binaries.
//!
//! Server-fault constructors (`server_data_loss`, `unknown`, `internal`,
//! `unavailable`, `deadline_exceeded`) mark details hidden at construction:
//! their payloads describe the server, not the request, and must not cross a
//! trust boundary by default.

use std::fmt::Display;
use std::iter;
use std::sync::OnceLock;

use crate::codes::Code;
use crate::details::{
    BadRequestViolation, PreconditionViolation, QuotaViolation, ResourceInfo,
};
use crate::logging::Severity;
use crate::ServiceError;

// ============================================================================
// Canonical messages
// ============================================================================

const MSG_INVALID_ARG: &str = "one request argument was invalid";
const MSG_INVALID_ARGS: &str = "one or more request arguments were invalid";
const MSG_PRECONDITION_FAILURE: &str = "one request precondition failed";
const MSG_PRECONDITION_FAILURES: &str = "one or more request preconditions failed";
const MSG_OUT_OF_RANGE: &str = "one request argument was out of range";
const MSG_OUT_OF_RANGE_BATCH: &str = "one or more request arguments were out of range";
const MSG_NOT_FOUND: &str = "requested resource not found";
const MSG_NOT_FOUND_BATCH: &str = "requested resources not found";
const MSG_ALREADY_EXISTS: &str = "resource already exists";
const MSG_ALREADY_EXISTS_BATCH: &str = "resources already exist";
const MSG_QUOTA_FAILURE: &str =
    "the request cannot be completed because the quota has been exhausted";
const MSG_CANCELLED: &str = "request cancelled by the client";
const MSG_NOT_IMPLEMENTED: &str = "not implemented";
const MSG_DEADLINE_EXCEEDED: &str = "the operation timed out (it might have succeeded though)";

// ============================================================================
// Default domain
// ============================================================================

static DOMAIN: OnceLock<String> = OnceLock::new();

/// Set the process-wide default error domain, typically the registered
/// service name (e.g. `pubsub.googleapis.com`). The first call wins; later
/// calls are ignored, so a library dependency can never repoint the domain
/// under the application.
///
/// Call once at startup, before constructing errors. Prefer
/// [`ErrorFactory::new`] where an explicit domain can be threaded through.
pub fn init(domain: impl Into<String>) {
    let _ = DOMAIN.set(domain.into());
}

/// The default domain, or `""` if [`init`] was never called.
pub(crate) fn default_domain() -> &'static str {
    DOMAIN.get().map_or("", String::as_str)
}

/// Empty metadata for the ErrorInfo-carrying constructors.
pub fn no_metadata() -> iter::Empty<(String, serde_json::Value)> {
    iter::empty()
}

// ============================================================================
// Free constructors (default domain)
// ============================================================================

/// `INVALID_ARGUMENT`: one request field is invalid regardless of system
/// state.
pub fn invalid_argument(
    field: impl Into<String>,
    description: impl Into<String>,
) -> ServiceError {
    ServiceError::new(Code::InvalidArgument, MSG_INVALID_ARG)
        .with_severity(Severity::Info)
        .with_bad_request_violations(vec![BadRequestViolation {
            field: field.into(),
            description: description.into(),
        }])
}

/// `INVALID_ARGUMENT`: several request fields are invalid.
pub fn invalid_arguments(violations: Vec<BadRequestViolation>) -> ServiceError {
    ServiceError::new(Code::InvalidArgument, MSG_INVALID_ARGS)
        .with_severity(Severity::Info)
        .with_bad_request_violations(violations)
}

/// `FAILED_PRECONDITION`: system state forbids the operation, e.g. terms of
/// service not accepted.
pub fn precondition_failure(
    subject: impl Into<String>,
    violation_type: impl Into<String>,
    description: impl Into<String>,
) -> ServiceError {
    ServiceError::new(Code::FailedPrecondition, MSG_PRECONDITION_FAILURE)
        .with_severity(Severity::Warn)
        .with_precondition_violations(vec![PreconditionViolation {
            subject: subject.into(),
            violation_type: violation_type.into(),
            description: description.into(),
        }])
}

/// `FAILED_PRECONDITION`: several preconditions failed.
pub fn precondition_failures(violations: Vec<PreconditionViolation>) -> ServiceError {
    ServiceError::new(Code::FailedPrecondition, MSG_PRECONDITION_FAILURES)
        .with_severity(Severity::Warn)
        .with_precondition_violations(violations)
}

/// `OUT_OF_RANGE`: a request field is outside the acceptable interval.
pub fn out_of_range(field: impl Into<String>, description: impl Into<String>) -> ServiceError {
    ServiceError::new(Code::OutOfRange, MSG_OUT_OF_RANGE)
        .with_severity(Severity::Info)
        .with_bad_request_violations(vec![BadRequestViolation {
            field: field.into(),
            description: description.into(),
        }])
}

/// `OUT_OF_RANGE`: several request fields are outside their intervals.
pub fn out_of_range_batch(violations: Vec<BadRequestViolation>) -> ServiceError {
    ServiceError::new(Code::OutOfRange, MSG_OUT_OF_RANGE_BATCH)
        .with_severity(Severity::Info)
        .with_bad_request_violations(violations)
}

/// `NOT_FOUND`: the requested resource does not exist.
pub fn not_found(info: ResourceInfo) -> ServiceError {
    ServiceError::new(Code::NotFound, MSG_NOT_FOUND)
        .with_severity(Severity::Info)
        .with_resource_infos(vec![info])
}

/// `NOT_FOUND`: several requested resources do not exist.
pub fn not_found_batch(infos: Vec<ResourceInfo>) -> ServiceError {
    ServiceError::new(Code::NotFound, MSG_NOT_FOUND_BATCH)
        .with_severity(Severity::Info)
        .with_resource_infos(infos)
}

/// `ALREADY_EXISTS`: the resource a client attempted to create exists.
pub fn already_exists(info: ResourceInfo) -> ServiceError {
    ServiceError::new(Code::AlreadyExists, MSG_ALREADY_EXISTS)
        .with_severity(Severity::Info)
        .with_resource_infos(vec![info])
}

/// `ALREADY_EXISTS`: several resources the client attempted to create exist.
pub fn already_exists_batch(infos: Vec<ResourceInfo>) -> ServiceError {
    ServiceError::new(Code::AlreadyExists, MSG_ALREADY_EXISTS_BATCH)
        .with_severity(Severity::Info)
        .with_resource_infos(infos)
}

/// `RESOURCE_EXHAUSTED`: a named quota is out; retry after the quota resets
/// or is raised, not immediately.
pub fn quota_failure(subject: impl Into<String>, description: impl Into<String>) -> ServiceError {
    ServiceError::new(Code::ResourceExhausted, MSG_QUOTA_FAILURE)
        .with_severity(Severity::Info)
        .with_quota_violations(vec![QuotaViolation {
            subject: subject.into(),
            description: description.into(),
        }])
}

/// `RESOURCE_EXHAUSTED`: several quotas are out.
pub fn quota_failure_batch(violations: Vec<QuotaViolation>) -> ServiceError {
    ServiceError::new(Code::ResourceExhausted, MSG_QUOTA_FAILURE)
        .with_severity(Severity::Info)
        .with_quota_violations(violations)
}

/// `RESOURCE_EXHAUSTED` with a structured cause, for exhaustion that is not a
/// client quota (e.g. the whole system is out of capacity).
pub fn resource_exhausted<K, V>(
    err: impl Display,
    reason: &str,
    metadata: impl IntoIterator<Item = (K, V)>,
) -> ServiceError
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    error_info_error(Code::ResourceExhausted, Severity::Warn, err, reason, metadata)
}

/// `ABORTED`: a concurrency conflict such as a failed optimistic lock.
/// Retry the enclosing transaction, not this call.
pub fn aborted<K, V>(
    err: impl Display,
    reason: &str,
    metadata: impl IntoIterator<Item = (K, V)>,
) -> ServiceError
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    error_info_error(Code::Aborted, Severity::Warn, err, reason, metadata)
}

/// `UNAUTHENTICATED`: the caller could not be identified.
pub fn unauthenticated<K, V>(
    err: impl Display,
    reason: &str,
    metadata: impl IntoIterator<Item = (K, V)>,
) -> ServiceError
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    error_info_error(Code::Unauthenticated, Severity::Info, err, reason, metadata)
}

/// `PERMISSION_DENIED`: the caller is known but not allowed.
pub fn permission_denied<K, V>(
    err: impl Display,
    reason: &str,
    metadata: impl IntoIterator<Item = (K, V)>,
) -> ServiceError
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    error_info_error(Code::PermissionDenied, Severity::Info, err, reason, metadata)
}

/// `DATA_LOSS` caused by the request itself, e.g. an upload the client must
/// redo. Details stay visible because the client needs them.
pub fn request_data_loss<K, V>(
    err: impl Display,
    reason: &str,
    metadata: impl IntoIterator<Item = (K, V)>,
) -> ServiceError
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    error_info_error(Code::DataLoss, Severity::Info, err, reason, metadata)
}

/// `CANCELLED`: the client gave up on the request. Severity is the caller's
/// call: cancellation is routine for some services and a signal for others.
pub fn cancelled(severity: Severity) -> ServiceError {
    ServiceError::new(Code::Cancelled, MSG_CANCELLED).with_severity(severity)
}

/// `DATA_LOSS` on the server side. Details hidden.
pub fn server_data_loss(err: impl Display) -> ServiceError {
    hidden_error(Code::DataLoss, err.to_string(), Severity::Error)
}

/// `UNKNOWN`: an unclassified failure, usually an error from a dependency
/// that no other constructor fits. Details hidden.
pub fn unknown(err: impl Display) -> ServiceError {
    hidden_error(Code::Unknown, err.to_string(), Severity::Error)
}

/// `INTERNAL`: a broken server invariant. Details hidden.
pub fn internal(err: impl Display) -> ServiceError {
    hidden_error(Code::Internal, err.to_string(), Severity::Error)
}

/// `NOT_IMPLEMENTED`: the operation is not implemented or not enabled.
pub fn not_implemented() -> ServiceError {
    ServiceError::new(Code::NotImplemented, MSG_NOT_IMPLEMENTED).with_severity(Severity::Info)
}

/// `UNAVAILABLE`: transient outage; the client may retry this call with
/// backoff. Details hidden.
pub fn unavailable(err: impl Display) -> ServiceError {
    hidden_error(Code::Unavailable, err.to_string(), Severity::Info)
}

/// `DEADLINE_EXCEEDED`: the operation timed out; it may have succeeded
/// anyway, so the enclosing operation must not assume failure. Details
/// hidden.
pub fn deadline_exceeded() -> ServiceError {
    hidden_error(Code::DeadlineExceeded, MSG_DEADLINE_EXCEEDED, Severity::Warn)
}

// ============================================================================
// Helpers
// ============================================================================

fn error_info_error<K, V>(
    code: Code,
    severity: Severity,
    err: impl Display,
    reason: &str,
    metadata: impl IntoIterator<Item = (K, V)>,
) -> ServiceError
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    // Empty domain resolves to the process default inside with_error_info.
    ServiceError::new(code, err.to_string())
        .with_severity(severity)
        .with_error_info("", reason, metadata)
}

fn hidden_error(code: Code, message: impl Into<String>, severity: Severity) -> ServiceError {
    ServiceError::new(code, message)
        .with_severity(severity)
        .hide_details()
}

// ============================================================================
// ErrorFactory
// ============================================================================

/// Constructor factory with an explicit error domain.
///
/// Identical to the free functions except that the ErrorInfo-carrying
/// constructors stamp this factory's domain instead of the process default.
/// Build one per service at startup and hand it to the code that classifies
/// errors.
#[derive(Debug, Clone)]
pub struct ErrorFactory {
    domain: String,
}

impl ErrorFactory {
    /// Factory stamping `domain` on every structured cause it creates.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// The domain this factory stamps.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// See [`invalid_argument`].
    pub fn invalid_argument(
        &self,
        field: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        invalid_argument(field, description)
    }

    /// See [`invalid_arguments`].
    pub fn invalid_arguments(&self, violations: Vec<BadRequestViolation>) -> ServiceError {
        invalid_arguments(violations)
    }

    /// See [`precondition_failure`].
    pub fn precondition_failure(
        &self,
        subject: impl Into<String>,
        violation_type: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        precondition_failure(subject, violation_type, description)
    }

    /// See [`precondition_failures`].
    pub fn precondition_failures(
        &self,
        violations: Vec<PreconditionViolation>,
    ) -> ServiceError {
        precondition_failures(violations)
    }

    /// See [`out_of_range`].
    pub fn out_of_range(
        &self,
        field: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        out_of_range(field, description)
    }

    /// See [`out_of_range_batch`].
    pub fn out_of_range_batch(&self, violations: Vec<BadRequestViolation>) -> ServiceError {
        out_of_range_batch(violations)
    }

    /// See [`not_found`].
    pub fn not_found(&self, info: ResourceInfo) -> ServiceError {
        not_found(info)
    }

    /// See [`not_found_batch`].
    pub fn not_found_batch(&self, infos: Vec<ResourceInfo>) -> ServiceError {
        not_found_batch(infos)
    }

    /// See [`already_exists`].
    pub fn already_exists(&self, info: ResourceInfo) -> ServiceError {
        already_exists(info)
    }

    /// See [`already_exists_batch`].
    pub fn already_exists_batch(&self, infos: Vec<ResourceInfo>) -> ServiceError {
        already_exists_batch(infos)
    }

    /// See [`quota_failure`].
    pub fn quota_failure(
        &self,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        quota_failure(subject, description)
    }

    /// See [`quota_failure_batch`].
    pub fn quota_failure_batch(&self, violations: Vec<QuotaViolation>) -> ServiceError {
        quota_failure_batch(violations)
    }

    /// See [`resource_exhausted`]; stamps this factory's domain.
    pub fn resource_exhausted<K, V>(
        &self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.error_info_error(Code::ResourceExhausted, Severity::Warn, err, reason, metadata)
    }

    /// See [`aborted`]; stamps this factory's domain.
    pub fn aborted<K, V>(
        &self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.error_info_error(Code::Aborted, Severity::Warn, err, reason, metadata)
    }

    /// See [`unauthenticated`]; stamps this factory's domain.
    pub fn unauthenticated<K, V>(
        &self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.error_info_error(Code::Unauthenticated, Severity::Info, err, reason, metadata)
    }

    /// See [`permission_denied`]; stamps this factory's domain.
    pub fn permission_denied<K, V>(
        &self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.error_info_error(Code::PermissionDenied, Severity::Info, err, reason, metadata)
    }

    /// See [`request_data_loss`]; stamps this factory's domain.
    pub fn request_data_loss<K, V>(
        &self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.error_info_error(Code::DataLoss, Severity::Info, err, reason, metadata)
    }

    /// See [`cancelled`].
    pub fn cancelled(&self, severity: Severity) -> ServiceError {
        cancelled(severity)
    }

    /// See [`server_data_loss`].
    pub fn server_data_loss(&self, err: impl Display) -> ServiceError {
        server_data_loss(err)
    }

    /// See [`unknown`].
    pub fn unknown(&self, err: impl Display) -> ServiceError {
        unknown(err)
    }

    /// See [`internal`].
    pub fn internal(&self, err: impl Display) -> ServiceError {
        internal(err)
    }

    /// See [`not_implemented`].
    pub fn not_implemented(&self) -> ServiceError {
        not_implemented()
    }

    /// See [`unavailable`].
    pub fn unavailable(&self, err: impl Display) -> ServiceError {
        unavailable(err)
    }

    /// See [`deadline_exceeded`].
    pub fn deadline_exceeded(&self) -> ServiceError {
        deadline_exceeded()
    }

    fn error_info_error<K, V>(
        &self,
        code: Code,
        severity: Severity,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        ServiceError::new(code, err.to_string())
            .with_severity(severity)
            .with_error_info(&self.domain, reason, metadata)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_side_constructors_stamp_code_message_and_severity() {
        let err = invalid_argument("user.email", "not an address");
        assert_eq!(err.code(), Code::InvalidArgument);
        assert_eq!(err.message(), MSG_INVALID_ARG);
        assert_eq!(err.severity(), Severity::Info);
        assert!(!err.is_details_hidden());
        assert_eq!(err.bad_request_violations()[0].field, "user.email");

        let err = precondition_failure("google.com/cloud", "TOS", "terms not accepted");
        assert_eq!(err.code(), Code::FailedPrecondition);
        assert_eq!(err.severity(), Severity::Warn);
        assert_eq!(err.precondition_violations()[0].violation_type, "TOS");

        let err = out_of_range("page_size", "must be <= 1000");
        assert_eq!(err.code(), Code::OutOfRange);
        assert_eq!(err.bad_request_violations().len(), 1);

        let err = quota_failure("per-minute reads", "read quota exceeded");
        assert_eq!(err.code(), Code::ResourceExhausted);
        assert_eq!(err.message(), MSG_QUOTA_FAILURE);
        assert_eq!(err.severity(), Severity::Info);
        assert_eq!(err.quota_violations().len(), 1);
    }

    #[test]
    fn batch_constructors_use_the_plural_messages() {
        assert_eq!(invalid_arguments(vec![]).message(), MSG_INVALID_ARGS);
        assert_eq!(
            precondition_failures(vec![]).message(),
            MSG_PRECONDITION_FAILURES
        );
        assert_eq!(out_of_range_batch(vec![]).message(), MSG_OUT_OF_RANGE_BATCH);
        assert_eq!(not_found_batch(vec![]).message(), MSG_NOT_FOUND_BATCH);
        assert_eq!(
            already_exists_batch(vec![]).message(),
            MSG_ALREADY_EXISTS_BATCH
        );
    }

    #[test]
    fn resource_constructors_attach_the_descriptor() {
        let info = ResourceInfo {
            resource_type: "example.v1.User".into(),
            resource_name: "users/17".into(),
            owner: String::new(),
            description: "no such user".into(),
        };
        let err = not_found(info.clone());
        assert_eq!(err.code(), Code::NotFound);
        assert_eq!(err.message(), MSG_NOT_FOUND);
        assert_eq!(err.resource_infos(), [info.clone()]);

        let err = already_exists(info);
        assert_eq!(err.code(), Code::AlreadyExists);
        assert_eq!(err.message(), MSG_ALREADY_EXISTS);
    }

    #[test]
    fn server_fault_constructors_hide_details() {
        for (err, code, severity) in [
            (server_data_loss("journal torn"), Code::DataLoss, Severity::Error),
            (unknown("no idea"), Code::Unknown, Severity::Error),
            (internal("invariant broken"), Code::Internal, Severity::Error),
            (unavailable("shedding load"), Code::Unavailable, Severity::Info),
            (deadline_exceeded(), Code::DeadlineExceeded, Severity::Warn),
        ] {
            assert_eq!(err.code(), code);
            assert_eq!(err.severity(), severity, "severity for {code}");
            assert!(err.is_details_hidden(), "details visible for {code}");
        }
        assert_eq!(deadline_exceeded().message(), MSG_DEADLINE_EXCEEDED);
    }

    #[test]
    fn error_info_constructors_carry_the_structured_cause() {
        let err = aborted("optimistic lock failed", "CONCURRENT_UPDATE", [("entity", "order")]);
        assert_eq!(err.code(), Code::Aborted);
        assert_eq!(err.severity(), Severity::Warn);
        assert_eq!(err.message(), "optimistic lock failed");
        let info = err.error_info().unwrap();
        assert_eq!(info.reason, "CONCURRENT_UPDATE");
        assert_eq!(info.metadata["entity"], "order");
        assert!(err.is_retryable_at_higher_level());

        let err = permission_denied("caller lacks writer role", "MISSING_ROLE", no_metadata());
        assert_eq!(err.code(), Code::PermissionDenied);
        assert_eq!(err.severity(), Severity::Info);
    }

    #[test]
    fn factory_domain_overrides_the_default() {
        let factory = ErrorFactory::new("books.example.com");
        let err = factory.unauthenticated("token expired", "TOKEN_EXPIRED", no_metadata());
        assert_eq!(err.error_info().unwrap().domain, "books.example.com");
        assert!(err.is_domain_error("books.example.com", "TOKEN_EXPIRED"));
    }

    #[test]
    fn cancelled_takes_the_severity_the_caller_chooses() {
        let err = cancelled(Severity::Debug);
        assert_eq!(err.code(), Code::Cancelled);
        assert_eq!(err.message(), MSG_CANCELLED);
        assert_eq!(err.severity(), Severity::Debug);
        assert!(!err.is_details_hidden());
    }
}
