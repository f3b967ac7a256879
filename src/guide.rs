//! A decision tree for picking the right constructor.
//!
//! Classification mistakes are cheap to make and expensive to unwind, so this
//! module turns the choice into a guided walk: start at [`error_guide`],
//! decide whether the problem lies with the request or with the server, then
//! narrow down by situation. Every leaf delegates straight to the matching
//! [`factory`](crate::factory) constructor, so the guide adds navigation and
//! documentation, never behavior.
//!
//! ```
//! use rampart_errors::guide::error_guide;
//!
//! let err = error_guide()
//!     .problem_with_request()
//!     .invalid_argument()
//!     .other("person.age", "must be a positive integer");
//! ```

use std::fmt::Display;

use crate::details::{PreconditionViolation, QuotaViolation, ResourceInfo};
use crate::factory;
use crate::logging::Severity;
use crate::ServiceError;

/// Entry point of the decision tree.
#[must_use]
pub fn error_guide() -> ErrorGuide {
    ErrorGuide
}

/// Root of the tree: whose problem is it?
#[derive(Debug, Clone, Copy)]
pub struct ErrorGuide;

impl ErrorGuide {
    /// The request itself is at fault: invalid input, missing credentials,
    /// a resource the client named does not exist, and so on.
    #[must_use]
    pub fn problem_with_request(self) -> RequestIssue {
        RequestIssue
    }

    /// The server cannot hold up its end: internal faults, outages,
    /// unmet preconditions, timeouts.
    #[must_use]
    pub fn problem_with_server(self) -> ServerIssue {
        ServerIssue
    }
}

// ============================================================================
// Request-side branch
// ============================================================================

/// Failures caused by the client's request.
#[derive(Debug, Clone, Copy)]
pub struct RequestIssue;

impl RequestIssue {
    /// The client gave up before the server finished. `CANCELLED`.
    pub fn cancelled(self, severity: Severity) -> ServiceError {
        factory::cancelled(severity)
    }

    /// The request carries invalid input. Narrow down by flavor.
    #[must_use]
    pub fn invalid_argument(self) -> InvalidArgIssue {
        InvalidArgIssue
    }

    /// The caller is authenticated but lacks permission, e.g. a file
    /// restricted to other users. `PERMISSION_DENIED`.
    pub fn permission_denied<K, V>(
        self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        factory::permission_denied(err, reason, metadata)
    }

    /// Identity verification failed: credentials missing, invalid or
    /// expired. `UNAUTHENTICATED`.
    pub fn unauthenticated<K, V>(
        self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        factory::unauthenticated(err, reason, metadata)
    }
}

/// Flavors of invalid input.
#[derive(Debug, Clone, Copy)]
pub struct InvalidArgIssue;

impl InvalidArgIssue {
    /// The default: a value that is simply wrong, like a malformed email
    /// address. Use when no specialized flavor fits. `INVALID_ARGUMENT`.
    pub fn other(
        self,
        field: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        factory::invalid_argument(field, description)
    }

    /// A value outside its acceptable interval, like a page number past the
    /// last page. `OUT_OF_RANGE`.
    pub fn out_of_range(
        self,
        field: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        factory::out_of_range(field, description)
    }

    /// The client named a resource that does not exist. `NOT_FOUND`.
    pub fn not_found(self, info: ResourceInfo) -> ServiceError {
        factory::not_found(info)
    }

    /// The request data itself arrived corrupted, e.g. a checksum mismatch
    /// on an upload the client must redo. `DATA_LOSS`.
    pub fn data_loss<K, V>(
        self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        factory::request_data_loss(err, reason, metadata)
    }
}

// ============================================================================
// Server-side branch
// ============================================================================

/// Failures on the server's side of the contract.
#[derive(Debug, Clone, Copy)]
pub struct ServerIssue;

impl ServerIssue {
    /// Stored data is corrupted or unrecoverable: a torn journal, a failed
    /// restore, a checksum mismatch on data the client never sent.
    /// `DATA_LOSS`.
    pub fn server_data_loss(self, err: impl Display) -> ServiceError {
        factory::server_data_loss(err)
    }

    /// A condition that must hold before the operation can run does not.
    /// Narrow down by flavor.
    #[must_use]
    pub fn precondition_failed(self) -> PrecondFailureIssue {
        PrecondFailureIssue
    }

    /// A failure that fits no other category, typically an unmapped error
    /// from a third-party dependency. `UNKNOWN`.
    pub fn unknown(self, err: impl Display) -> ServiceError {
        factory::unknown(err)
    }

    /// A broken server-side invariant: bad configuration, an unreachable
    /// database, a critical dependency whose error must not leak through.
    /// `INTERNAL`.
    pub fn internal(self, err: impl Display) -> ServiceError {
        factory::internal(err)
    }

    /// The operation is not implemented, not enabled, or was removed.
    /// `NOT_IMPLEMENTED`.
    pub fn not_implemented(self) -> ServiceError {
        factory::not_implemented()
    }

    /// The whole server is temporarily down: overload, maintenance, a dead
    /// dependency. The client may retry this call with backoff.
    /// `UNAVAILABLE`.
    pub fn unavailable(self, err: impl Display) -> ServiceError {
        factory::unavailable(err)
    }

    /// The operation ran out of time. It might have succeeded anyway, so
    /// callers must not assume failure. `DEADLINE_EXCEEDED`.
    pub fn deadline_exceeded(self) -> ServiceError {
        factory::deadline_exceeded()
    }
}

/// Flavors of failed preconditions.
#[derive(Debug, Clone, Copy)]
pub struct PrecondFailureIssue;

impl PrecondFailureIssue {
    /// The default: state the client can change, like unaccepted terms of
    /// service. Use when no specialized flavor fits. `FAILED_PRECONDITION`.
    pub fn other(
        self,
        subject: impl Into<String>,
        violation_type: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        factory::precondition_failure(subject, violation_type, description)
    }

    /// Several preconditions failed at once. `FAILED_PRECONDITION`.
    pub fn many(self, violations: Vec<PreconditionViolation>) -> ServiceError {
        factory::precondition_failures(violations)
    }

    /// A concurrency conflict: an optimistic lock lost the race, a
    /// transaction coordinator bailed. Retry the enclosing transaction.
    /// `ABORTED`.
    pub fn aborted<K, V>(
        self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        factory::aborted(err, reason, metadata)
    }

    /// The resource the client tried to create is already there, like a
    /// taken username or a duplicate primary key. `ALREADY_EXISTS`.
    pub fn already_exists(self, info: ResourceInfo) -> ServiceError {
        factory::already_exists(info)
    }

    /// Some resource ran out. Narrow down by flavor.
    #[must_use]
    pub fn resource_exhausted(self) -> ResourceExhaustedIssue {
        ResourceExhaustedIssue
    }
}

/// Flavors of exhausted resources.
#[derive(Debug, Clone, Copy)]
pub struct ResourceExhaustedIssue;

impl ResourceExhaustedIssue {
    /// Exhaustion that is not a client quota, like the server running out
    /// of memory or storage. `RESOURCE_EXHAUSTED`.
    pub fn other<K, V>(
        self,
        err: impl Display,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> ServiceError
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        factory::resource_exhausted(err, reason, metadata)
    }

    /// An allotted quota or rate limit was exceeded. `RESOURCE_EXHAUSTED`
    /// with a quota detail.
    pub fn quota_failure(
        self,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceError {
        factory::quota_failure(subject, description)
    }

    /// Several quotas exceeded at once.
    pub fn quota_failures(self, violations: Vec<QuotaViolation>) -> ServiceError {
        factory::quota_failure_batch(violations)
    }
}

// ============================================================================
// Tests
// ============================================================================
