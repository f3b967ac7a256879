//! Classification codes - the closed error taxonomy.
//!
//! The sixteen codes mirror the canonical RPC status taxonomy (every value
//! except `OK`, which is not an error). Every [`ServiceError`](crate::ServiceError)
//! carries exactly one code, stamped at construction; there is no setter, so
//! re-classification means constructing a new error.
//!
//! # Classification Axes
//!
//! Each code carries two independent axes:
//!
//! - **Origin**: whether the problem lies with the request or with the server.
//!   Informational only - it guides constructor choice (see [`crate::guide`])
//!   and is not encoded as a field.
//! - **Retryability**: exactly one code ([`Code::Unavailable`]) is directly
//!   retryable; exactly two ([`Code::ResourceExhausted`], [`Code::Aborted`])
//!   are retryable at a higher level (redo the enclosing operation, e.g. the
//!   whole transaction); every other code is not retryable. This mapping is a
//!   pure function of the code and a primary tested property.
//!
//! # Zero-Allocation Guarantee
//!
//! All operations in this module are const and allocation-free: numeric value,
//! name, HTTP mapping and the retry predicates compile to direct lookups.

use std::fmt;

/// Classification code for a [`ServiceError`](crate::ServiceError).
///
/// Discriminants are the canonical numeric values of the RPC status taxonomy,
/// so [`Code::value`] is a direct cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Code {
    /// The request was cancelled by the client.
    Cancelled = 1,
    /// The failure cause is unknown; often an unclassified error from a
    /// dependency.
    Unknown = 2,
    /// A request argument was invalid regardless of system state.
    InvalidArgument = 3,
    /// The operation timed out (it might have succeeded anyway).
    DeadlineExceeded = 4,
    /// A requested resource was not found.
    NotFound = 5,
    /// The resource a client attempted to create already exists.
    AlreadyExists = 6,
    /// The caller is known but lacks permission for the operation.
    PermissionDenied = 7,
    /// A resource such as a quota or storage capacity is exhausted.
    ResourceExhausted = 8,
    /// System state does not allow the operation (e.g. unaccepted terms).
    FailedPrecondition = 9,
    /// The operation was aborted, typically a concurrency conflict.
    Aborted = 10,
    /// A request argument was outside the acceptable range.
    OutOfRange = 11,
    /// The operation is not implemented or not enabled.
    NotImplemented = 12,
    /// An invariant the server relies on was broken.
    Internal = 13,
    /// The service is temporarily unavailable.
    Unavailable = 14,
    /// Unrecoverable data loss or corruption.
    DataLoss = 15,
    /// The caller could not be identified.
    Unauthenticated = 16,
}

impl Code {
    /// Every classification code, in canonical numeric order.
    pub const ALL: [Code; 16] = [
        Code::Cancelled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::NotImplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
    ];

    /// Canonical numeric value of this code.
    #[inline]
    pub const fn value(self) -> u32 {
        self as u32
    }

    /// Canonical UPPER_SNAKE_CASE name, as rendered in the HTTP error body's
    /// `status` field.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Aborted => "ABORTED",
            Code::OutOfRange => "OUT_OF_RANGE",
            Code::NotImplemented => "NOT_IMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::DataLoss => "DATA_LOSS",
            Code::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    /// Conventional HTTP status for this code.
    ///
    /// Follows the google.rpc mapping, including the non-standard 499 for
    /// [`Code::Cancelled`].
    #[inline]
    pub const fn http_status(self) -> u16 {
        match self {
            Code::Cancelled => 499,
            Code::Unknown => 500,
            Code::InvalidArgument => 400,
            Code::DeadlineExceeded => 504,
            Code::NotFound => 404,
            Code::AlreadyExists => 409,
            Code::PermissionDenied => 403,
            Code::ResourceExhausted => 429,
            Code::FailedPrecondition => 400,
            Code::Aborted => 409,
            Code::OutOfRange => 400,
            Code::NotImplemented => 501,
            Code::Internal => 500,
            Code::Unavailable => 503,
            Code::DataLoss => 500,
            Code::Unauthenticated => 401,
        }
    }

    /// True if the failed call itself may be retried as-is (with backoff).
    ///
    /// Exactly one code qualifies: [`Code::Unavailable`].
    #[inline]
    pub const fn is_directly_retryable(self) -> bool {
        matches!(self, Code::Unavailable)
    }

    /// True if the failed call should not be retried directly, but redoing a
    /// larger enclosing operation makes sense. Example: an optimistic
    /// concurrency conflict inside a transaction, where the whole transaction
    /// is the retry unit.
    #[inline]
    pub const fn is_retryable_at_higher_level(self) -> bool {
        matches!(self, Code::ResourceExhausted | Code::Aborted)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
