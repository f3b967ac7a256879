//! Typed detail payloads and the group container that holds them.
//!
//! A [`ServiceError`](crate::ServiceError) carries machine-readable context as
//! an ordered list of [`DetailGroup`]s, at most one group per [`DetailKind`].
//! List-shaped kinds (bad request, precondition, quota, resource info) append
//! records into their single group; [`ErrorInfo`] overwrites wholesale;
//! [`DebugInfo`] is set once and then frozen.
//!
//! # Sensitivity
//!
//! [`ErrorInfo`] and [`DebugInfo`] are the two kinds that may leak internals
//! (infrastructure domains, stack traces). They are the exact set stripped by
//! [`ServiceError::remove_sensitive_details`](crate::ServiceError::remove_sensitive_details),
//! and both implement [`Zeroize`] so a stripped payload can be cleared rather
//! than merely dropped.
//!
//! Wire names are camelCase to match the google.rpc JSON rendering.

use std::collections::BTreeMap;
use std::mem;

use serde::Serialize;
use zeroize::Zeroize;

// ============================================================================
// Detail records
// ============================================================================

/// One invalid request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadRequestViolation {
    /// Path to the offending field, e.g. `"user.email"`.
    pub field: String,
    /// Human-readable description of why the field is invalid.
    pub description: String,
}

/// One failed precondition: system state that forbids the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreconditionViolation {
    /// The subject the precondition applies to, e.g. `"projects/p1"`.
    pub subject: String,
    /// Service-defined violation category, e.g. `"TOS"`. Serializes as
    /// `type`, the payload's canonical wire name.
    #[serde(rename = "type")]
    pub violation_type: String,
    /// Human-readable description of how the precondition failed.
    pub description: String,
}

/// Structured cause: a stable machine-matchable `(domain, reason)` pair plus
/// free-form string metadata.
///
/// This is the payload callers match on programmatically (see
/// [`ServiceError::is_domain_error`](crate::ServiceError::is_domain_error)),
/// and one of the two sensitive kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Logical origin of the error, typically a service or package name.
    pub domain: String,
    /// UPPER_SNAKE_CASE cause identifier, unique within the domain.
    pub reason: String,
    /// Additional dynamic context, values stringified.
    pub metadata: BTreeMap<String, String>,
}

/// One exhausted quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaViolation {
    /// The quota checker's label for the exhausted quota.
    pub subject: String,
    /// Human-readable description of how the quota was exceeded.
    pub description: String,
}

/// Identity of a resource an operation touched or failed to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    /// Type of the resource, e.g. a fully-qualified message name.
    pub resource_type: String,
    /// Name or identifier of the specific resource instance.
    pub resource_name: String,
    /// Owner of the resource, if relevant.
    pub owner: String,
    /// Human-readable description of what happened to the resource.
    pub description: String,
}

/// Server-internal debugging context. Sensitive; never meant for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// Free-form debugging detail.
    pub detail: String,
    /// Stack entries or breadcrumbs, outermost first.
    pub stack_entries: Vec<String>,
}

// ============================================================================
// Zeroize
// ============================================================================

impl Zeroize for ErrorInfo {
    fn zeroize(&mut self) {
        self.domain.zeroize();
        self.reason.zeroize();
        // BTreeMap has no in-place clear-and-wipe; take it apart and wipe
        // each entry before dropping.
        for (mut key, mut value) in mem::take(&mut self.metadata) {
            key.zeroize();
            value.zeroize();
        }
    }
}

impl Zeroize for DebugInfo {
    fn zeroize(&mut self) {
        self.detail.zeroize();
        for entry in &mut self.stack_entries {
            entry.zeroize();
        }
        self.stack_entries.clear();
    }
}

// ============================================================================
// Groups
// ============================================================================

/// Discriminant for the six detail kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    BadRequest,
    PreconditionFailure,
    ErrorInfo,
    QuotaFailure,
    ResourceInfo,
    DebugInfo,
}

/// One group of detail payloads of a single kind.
///
/// A [`ServiceError`](crate::ServiceError) holds at most one group per kind;
/// the grouping invariants live in the error's mutators, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailGroup {
    BadRequest(Vec<BadRequestViolation>),
    PreconditionFailure(Vec<PreconditionViolation>),
    ErrorInfo(ErrorInfo),
    QuotaFailure(Vec<QuotaViolation>),
    ResourceInfo(Vec<ResourceInfo>),
    DebugInfo(DebugInfo),
}

impl DetailGroup {
    /// Kind discriminant of this group.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> DetailKind {
        match self {
            DetailGroup::BadRequest(_) => DetailKind::BadRequest,
            DetailGroup::PreconditionFailure(_) => DetailKind::PreconditionFailure,
            DetailGroup::ErrorInfo(_) => DetailKind::ErrorInfo,
            DetailGroup::QuotaFailure(_) => DetailKind::QuotaFailure,
            DetailGroup::ResourceInfo(_) => DetailKind::ResourceInfo,
            DetailGroup::DebugInfo(_) => DetailKind::DebugInfo,
        }
    }

    /// True for the kinds that may carry server internals (ErrorInfo and
    /// DebugInfo). Exactly this set is removed by
    /// [`ServiceError::remove_sensitive_details`](crate::ServiceError::remove_sensitive_details).
    #[inline]
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        matches!(self, DetailGroup::ErrorInfo(_) | DetailGroup::DebugInfo(_))
    }

    /// Wipe the payload of a sensitive group in place. No-op for the
    /// non-sensitive kinds.
    pub(crate) fn zeroize_payload(&mut self) {
        match self {
            DetailGroup::ErrorInfo(info) => info.zeroize(),
            DetailGroup::DebugInfo(info) => info.zeroize(),
            _ => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_covers_exactly_error_info_and_debug_info() {
        let groups = [
            DetailGroup::BadRequest(vec![]),
            DetailGroup::PreconditionFailure(vec![]),
            DetailGroup::ErrorInfo(ErrorInfo {
                domain: "svc".into(),
                reason: "R".into(),
                metadata: BTreeMap::new(),
            }),
            DetailGroup::QuotaFailure(vec![]),
            DetailGroup::ResourceInfo(vec![]),
            DetailGroup::DebugInfo(DebugInfo {
                detail: "boom".into(),
                stack_entries: vec![],
            }),
        ];
        for group in &groups {
            let expected = matches!(
                group.kind(),
                DetailKind::ErrorInfo | DetailKind::DebugInfo
            );
            assert_eq!(group.is_sensitive(), expected, "{:?}", group.kind());
        }
    }

    #[test]
    fn zeroize_clears_error_info_payload() {
        let mut info = ErrorInfo {
            domain: "billing".into(),
            reason: "QUOTA".into(),
            metadata: BTreeMap::from([("tenant".to_owned(), "acme".to_owned())]),
        };
        info.zeroize();
        assert!(info.domain.is_empty());
        assert!(info.reason.is_empty());
        assert!(info.metadata.is_empty());
    }

    #[test]
    fn zeroize_clears_debug_info_payload() {
        let mut info = DebugInfo {
            detail: "stack overflow in frobnicator".into(),
            stack_entries: vec!["frame 0".into(), "frame 1".into()],
        };
        info.zeroize();
        assert!(info.detail.is_empty());
        assert!(info.stack_entries.is_empty());
    }

    #[test]
    fn records_serialize_with_camel_case_wire_names() {
        let violation = PreconditionViolation {
            subject: "projects/p1".into(),
            violation_type: "TOS".into(),
            description: "terms not accepted".into(),
        };
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["type"], "TOS");

        let info = ResourceInfo {
            resource_type: "example.v1.User".into(),
            resource_name: "users/17".into(),
            owner: String::new(),
            description: "missing".into(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["resourceType"], "example.v1.User");
        assert_eq!(json["resourceName"], "users/17");
    }
}
