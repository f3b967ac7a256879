//! # rampart_errors
//!
//! Structured service errors: classify once at the failure site, enrich with
//! machine-readable detail on the way up, render consistently at the RPC and
//! HTTP boundaries.
//!
//! The central value is [`ServiceError`]: a classification [`Code`], a
//! human-readable message, an ordered list of typed detail groups, free-form
//! runtime state for logs, an advisory [`Severity`] and a redaction flag.
//! Errors are plain values with consuming builder-style mutators, so the
//! normal flow reads as one chain:
//!
//! ```
//! use rampart_errors::factory;
//!
//! let err = factory::not_found(rampart_errors::ResourceInfo {
//!     resource_type: "example.v1.User".into(),
//!     resource_name: "users/17".into(),
//!     owner: String::new(),
//!     description: "no such user".into(),
//! })
//! .with_var("tenant", "acme")
//! .with_error_info("auth.example.com", "USER_MISSING", [("lookup", "by-id")]);
//!
//! assert!(err.is_domain_error("auth.example.com", "USER_MISSING"));
//! ```
//!
//! # Design Rationale - One Code, Many Details
//!
//! The classification code answers "what class of failure is this" and is
//! fixed at construction; there is no setter, so a re-classified error is a
//! new error. Everything else (details, state, severity, redaction) may be
//! layered on as the error travels up the stack. Detail groups obey three
//! invariants, enforced by the mutators rather than the container:
//!
//! - list kinds (bad request, precondition, quota, resource info) keep a
//!   single group per kind and append within it;
//! - [`ErrorInfo`] is a singleton that later writes overwrite wholesale;
//! - [`DebugInfo`] is a singleton frozen by its first write.
//!
//! # Design Rationale - Redaction Is a Boundary Concern
//!
//! [`ServiceError::hide_details`] sets a flag; it does not destroy anything.
//! Server-side code keeps full visibility for logging and handling, and the
//! boundary adapters ([`grpc`], [`http`]) apply
//! [`ServiceError::remove_sensitive_details`] to a clone on the way out. The
//! two sensitive kinds (ErrorInfo, DebugInfo) are zeroized when stripped.
//!
//! # Propagation
//!
//! Functions that may fail with either a classified error or an arbitrary
//! upstream error return [`Fault`]: [`Fault::Service`] carries a
//! [`ServiceError`] losslessly, [`Fault::Opaque`] boxes anything else, and
//! [`Fault::context`] layers a call-site message on either without burying
//! it. [`Fault::into_service`] collapses the opaque case to code `UNKNOWN`.

#![forbid(unsafe_code)]

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

pub mod codes;
pub mod details;
pub mod factory;
pub mod guide;
pub mod logging;

#[cfg(feature = "grpc")]
pub mod grpc;
#[cfg(feature = "http")]
pub mod http;

pub use codes::Code;
pub use details::{
    BadRequestViolation, DebugInfo, DetailGroup, DetailKind, ErrorInfo, PreconditionViolation,
    QuotaViolation, ResourceInfo,
};
pub use factory::{init, ErrorFactory};
pub use logging::Severity;

/// Result alias over [`Fault`], the crate's propagation type.
pub type Result<T, E = Fault> = std::result::Result<T, E>;

// ============================================================================
// Runtime state
// ============================================================================

/// One named runtime-state value attached to an error for logging.
///
/// Insertion order is preserved and duplicate names are retained; state is a
/// breadcrumb trail, not a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Var {
    pub name: String,
    pub value: serde_json::Value,
}

// ============================================================================
// ServiceError
// ============================================================================

/// A classified service error.
///
/// Value semantics throughout: `Clone` is a deep copy, mutators consume and
/// return `self`, and mutating a clone never affects the original. Because
/// mutation requires ownership or `&mut`, sharing one instance across tasks
/// forces external synchronization by construction.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ServiceError {
    code: Code,
    message: String,
    details: Vec<DetailGroup>,
    runtime_state: SmallVec<[Var; 4]>,
    severity: Severity,
    details_hidden: bool,
}

impl ServiceError {
    /// Bare error with the given classification and message. Severity starts
    /// [`Severity::Unspecified`], details visible. Construction goes through
    /// [`factory`]; this stays crate-private so every error gets canonical
    /// defaults.
    pub(crate) fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
            runtime_state: SmallVec::new(),
            severity: Severity::Unspecified,
            details_hidden: false,
        }
    }

    fn position(&self, kind: DetailKind) -> Option<usize> {
        self.details.iter().position(|group| group.kind() == kind)
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Append bad-request violations. All violations of this kind share one
    /// group regardless of how many calls produced them; an empty list is a
    /// no-op.
    pub fn with_bad_request_violations(mut self, violations: Vec<BadRequestViolation>) -> Self {
        if violations.is_empty() {
            return self;
        }
        match self.position(DetailKind::BadRequest) {
            Some(i) => {
                if let DetailGroup::BadRequest(existing) = &mut self.details[i] {
                    existing.extend(violations);
                }
            }
            None => self.details.push(DetailGroup::BadRequest(violations)),
        }
        self
    }

    /// Append precondition violations into the single precondition group.
    /// An empty list is a no-op.
    pub fn with_precondition_violations(
        mut self,
        violations: Vec<PreconditionViolation>,
    ) -> Self {
        if violations.is_empty() {
            return self;
        }
        match self.position(DetailKind::PreconditionFailure) {
            Some(i) => {
                if let DetailGroup::PreconditionFailure(existing) = &mut self.details[i] {
                    existing.extend(violations);
                }
            }
            None => self
                .details
                .push(DetailGroup::PreconditionFailure(violations)),
        }
        self
    }

    /// Append quota violations into the single quota group. An empty list is
    /// a no-op.
    pub fn with_quota_violations(mut self, violations: Vec<QuotaViolation>) -> Self {
        if violations.is_empty() {
            return self;
        }
        match self.position(DetailKind::QuotaFailure) {
            Some(i) => {
                if let DetailGroup::QuotaFailure(existing) = &mut self.details[i] {
                    existing.extend(violations);
                }
            }
            None => self.details.push(DetailGroup::QuotaFailure(violations)),
        }
        self
    }

    /// Append resource descriptors into the single resource-info group. An
    /// empty list is a no-op.
    pub fn with_resource_infos(mut self, infos: Vec<ResourceInfo>) -> Self {
        if infos.is_empty() {
            return self;
        }
        match self.position(DetailKind::ResourceInfo) {
            Some(i) => {
                if let DetailGroup::ResourceInfo(existing) = &mut self.details[i] {
                    existing.extend(infos);
                }
            }
            None => self.details.push(DetailGroup::ResourceInfo(infos)),
        }
        self
    }

    /// Set the structured cause. A later call replaces the previous ErrorInfo
    /// wholesale (reason, domain and metadata together).
    ///
    /// An empty `reason` makes the call a no-op: a cause without a reason is
    /// not matchable and would only shadow a real one. An empty `domain`
    /// falls back to the process-wide default set by [`init`]. Metadata
    /// values are stringified; a JSON string keeps its content without
    /// quoting, everything else renders as compact JSON.
    pub fn with_error_info<K, V>(
        mut self,
        domain: &str,
        reason: &str,
        metadata: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        if reason.is_empty() {
            return self;
        }
        let domain = if domain.is_empty() {
            factory::default_domain().to_owned()
        } else {
            domain.to_owned()
        };
        let metadata = metadata
            .into_iter()
            .map(|(key, value)| {
                let value = match value.into() {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key.into(), value)
            })
            .collect();
        let info = ErrorInfo {
            domain,
            reason: reason.to_owned(),
            metadata,
        };
        match self.position(DetailKind::ErrorInfo) {
            Some(i) => self.details[i] = DetailGroup::ErrorInfo(info),
            None => self.details.push(DetailGroup::ErrorInfo(info)),
        }
        self
    }

    /// Attach server-internal debugging context. First write wins: once set,
    /// later calls are no-ops, so the context closest to the failure site
    /// survives. An empty `detail` is a no-op.
    pub fn with_debug_info(
        mut self,
        detail: impl Into<String>,
        stack_entries: Vec<String>,
    ) -> Self {
        let detail = detail.into();
        if detail.is_empty() || self.position(DetailKind::DebugInfo).is_some() {
            return self;
        }
        self.details.push(DetailGroup::DebugInfo(DebugInfo {
            detail,
            stack_entries,
        }));
        self
    }

    /// Record one runtime-state value. Empty names and JSON null values are
    /// dropped silently; duplicates are kept in insertion order.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        let name = name.into();
        let value = value.into();
        if !name.is_empty() && !value.is_null() {
            self.runtime_state.push(Var { name, value });
        }
        self
    }

    /// Record several runtime-state values, with the same dropping rules as
    /// [`ServiceError::with_var`].
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        for (name, value) in vars {
            self = self.with_var(name, value);
        }
        self
    }

    /// Override the advisory severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Mark the details for redaction at trust boundaries. Local access is
    /// unaffected; only the boundary adapters act on the flag.
    pub fn hide_details(mut self) -> Self {
        self.details_hidden = true;
        self
    }

    /// Clear the redaction mark set by [`ServiceError::hide_details`].
    pub fn show_details(mut self) -> Self {
        self.details_hidden = false;
        self
    }

    /// Strip the sensitive detail kinds (ErrorInfo and DebugInfo), preserving
    /// the order of everything else. Stripped payloads are zeroized before
    /// being dropped.
    pub fn remove_sensitive_details(mut self) -> Self {
        self.details.retain_mut(|group| {
            if group.is_sensitive() {
                group.zeroize_payload();
                false
            } else {
                true
            }
        });
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Classification code.
    #[inline]
    #[must_use]
    pub const fn code(&self) -> Code {
        self.code
    }

    /// Human-readable message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Advisory severity.
    #[inline]
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// True if the details are marked for redaction at trust boundaries.
    #[inline]
    #[must_use]
    pub const fn is_details_hidden(&self) -> bool {
        self.details_hidden
    }

    /// All detail groups, in first-touch order.
    #[inline]
    #[must_use]
    pub fn detail_groups(&self) -> &[DetailGroup] {
        &self.details
    }

    /// The group of the given kind, if any.
    #[must_use]
    pub fn detail_group(&self, kind: DetailKind) -> Option<&DetailGroup> {
        self.details.iter().find(|group| group.kind() == kind)
    }

    /// Bad-request violations; empty if none were attached.
    #[must_use]
    pub fn bad_request_violations(&self) -> &[BadRequestViolation] {
        match self.detail_group(DetailKind::BadRequest) {
            Some(DetailGroup::BadRequest(violations)) => violations,
            _ => &[],
        }
    }

    /// Precondition violations; empty if none were attached.
    #[must_use]
    pub fn precondition_violations(&self) -> &[PreconditionViolation] {
        match self.detail_group(DetailKind::PreconditionFailure) {
            Some(DetailGroup::PreconditionFailure(violations)) => violations,
            _ => &[],
        }
    }

    /// Quota violations; empty if none were attached.
    #[must_use]
    pub fn quota_violations(&self) -> &[QuotaViolation] {
        match self.detail_group(DetailKind::QuotaFailure) {
            Some(DetailGroup::QuotaFailure(violations)) => violations,
            _ => &[],
        }
    }

    /// Resource descriptors; empty if none were attached.
    #[must_use]
    pub fn resource_infos(&self) -> &[ResourceInfo] {
        match self.detail_group(DetailKind::ResourceInfo) {
            Some(DetailGroup::ResourceInfo(infos)) => infos,
            _ => &[],
        }
    }

    /// The structured cause, if one was set.
    #[must_use]
    pub fn error_info(&self) -> Option<&ErrorInfo> {
        match self.detail_group(DetailKind::ErrorInfo) {
            Some(DetailGroup::ErrorInfo(info)) => Some(info),
            _ => None,
        }
    }

    /// The debugging context, if one was set.
    #[must_use]
    pub fn debug_info(&self) -> Option<&DebugInfo> {
        match self.detail_group(DetailKind::DebugInfo) {
            Some(DetailGroup::DebugInfo(info)) => Some(info),
            _ => None,
        }
    }

    /// Accumulated runtime state, in insertion order.
    #[inline]
    #[must_use]
    pub fn runtime_state(&self) -> &[Var] {
        &self.runtime_state
    }

    /// True if the call may be retried as-is. Pure function of the code.
    #[inline]
    #[must_use]
    pub const fn is_directly_retryable(&self) -> bool {
        self.code.is_directly_retryable()
    }

    /// True if a larger enclosing operation is the sensible retry unit.
    /// Pure function of the code.
    #[inline]
    #[must_use]
    pub const fn is_retryable_at_higher_level(&self) -> bool {
        self.code.is_retryable_at_higher_level()
    }

    /// True if the structured cause matches the given domain and reason
    /// exactly. False when no cause is set.
    #[must_use]
    pub fn is_domain_error(&self, domain: &str, reason: &str) -> bool {
        self.error_info()
            .is_some_and(|info| info.domain == domain && info.reason == reason)
    }

    /// Match key of the structured cause, if one is set. Equal keys mean
    /// equal `(domain, reason)` pairs; see [`domain_key`].
    #[must_use]
    pub fn domain_key(&self) -> Option<String> {
        self.error_info()
            .map(|info| domain_key(&info.domain, &info.reason))
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.name(), self.message)
    }
}

impl StdError for ServiceError {}

/// Build the match key for a `(domain, reason)` pair.
///
/// The parts are joined with a NUL byte, which cannot appear in either part
/// in practice, so distinct pairs never collide the way plain concatenation
/// would (`("ab", "c")` vs `("a", "bc")`).
#[must_use]
pub fn domain_key(domain: &str, reason: &str) -> String {
    format!("{domain}\0{reason}")
}

// ============================================================================
// Fault
// ============================================================================

/// A propagated failure: either a classified [`ServiceError`] or an opaque
/// error from outside the taxonomy, optionally layered with call-site
/// context.
///
/// Adapters and handlers match on the variant instead of downcasting, so the
/// classified case is extracted losslessly. [`Fault::context`] adds a message
/// per stack frame the way callers annotate errors on the way up; context is
/// display-only and never survives classification of a service error.
#[derive(Debug)]
pub enum Fault {
    /// A classified error, carried intact.
    Service(ServiceError),
    /// Anything else. Collapsed to `UNKNOWN` when a classification is forced.
    Opaque(Box<dyn StdError + Send + Sync>),
    /// A fault annotated with a context message. Displays as
    /// `"{message}: {inner}"`; the inner fault stays reachable.
    Context {
        message: String,
        inner: Box<Fault>,
    },
}

impl Fault {
    /// Wrap an arbitrary error as the opaque variant.
    pub fn opaque(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Fault::Opaque(err.into())
    }

    /// Layer a context message onto this fault. An empty message is a no-op.
    ///
    /// ```
    /// use rampart_errors::{factory, Fault};
    ///
    /// let fault = Fault::from(factory::not_implemented()).context("loading profile");
    /// assert_eq!(fault.to_string(), "loading profile: NOT_IMPLEMENTED: not implemented");
    /// assert!(fault.service().is_some());
    /// ```
    #[must_use]
    pub fn context(self, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            return self;
        }
        Fault::Context {
            message,
            inner: Box::new(self),
        }
    }

    /// The classified error, if this fault carries one anywhere under its
    /// context layers.
    #[must_use]
    pub fn service(&self) -> Option<&ServiceError> {
        match self {
            Fault::Service(err) => Some(err),
            Fault::Opaque(_) => None,
            Fault::Context { inner, .. } => inner.service(),
        }
    }

    /// Record one runtime-state value on the classified error under the
    /// context layers, if there is one. A no-op on opaque faults, with the
    /// same dropping rules as [`ServiceError::with_var`].
    pub fn with_var(
        self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        match self {
            Fault::Service(err) => Fault::Service(err.with_var(name, value)),
            opaque @ Fault::Opaque(_) => opaque,
            Fault::Context { message, inner } => Fault::Context {
                message,
                inner: Box::new(inner.with_var(name, value)),
            },
        }
    }

    /// Force a classification. A service variant passes through untouched
    /// and sheds its context layers (context is for display and logs, the
    /// classified error is already complete). An opaque fault becomes
    /// `UNKNOWN` with its full display text, error severity and hidden
    /// details.
    pub fn into_service(self) -> ServiceError {
        match self {
            Fault::Service(err) => err,
            Fault::Opaque(err) => factory::unknown(err),
            Fault::Context { message, inner } => {
                if inner.service().is_some() {
                    inner.into_service()
                } else {
                    factory::unknown(format!("{message}: {inner}"))
                }
            }
        }
    }
}

impl From<ServiceError> for Fault {
    fn from(err: ServiceError) -> Self {
        Fault::Service(err)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Service(err) => err.fmt(f),
            Fault::Opaque(err) => err.fmt(f),
            Fault::Context { message, inner } => write!(f, "{message}: {inner}"),
        }
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Fault::Service(err) => Some(err),
            Fault::Opaque(err) => {
                let source: &(dyn StdError + 'static) = err.as_ref();
                Some(source)
            }
            Fault::Context { inner, .. } => Some(inner.as_ref()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(field: &str) -> BadRequestViolation {
        BadRequestViolation {
            field: field.into(),
            description: format!("{field} is invalid"),
        }
    }

    #[test]
    fn list_kinds_accumulate_into_a_single_group() {
        let err = factory::invalid_argument("a", "bad")
            .with_bad_request_violations(vec![violation("b"), violation("c")])
            .with_bad_request_violations(vec![violation("d")]);

        let groups: Vec<_> = err
            .detail_groups()
            .iter()
            .filter(|g| g.kind() == DetailKind::BadRequest)
            .collect();
        assert_eq!(groups.len(), 1);

        let fields: Vec<_> = err
            .bad_request_violations()
            .iter()
            .map(|v| v.field.as_str())
            .collect();
        assert_eq!(fields, ["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_violation_lists_are_no_ops() {
        let err = factory::internal("boom")
            .with_bad_request_violations(vec![])
            .with_quota_violations(vec![])
            .with_resource_infos(vec![])
            .with_precondition_violations(vec![]);
        assert!(err.detail_groups().is_empty());
    }

    #[test]
    fn error_info_overwrites_wholesale() {
        let err = factory::internal("boom")
            .with_error_info("old.domain", "OLD_REASON", [("k", "v")])
            .with_error_info("new.domain", "NEW_REASON", std::iter::empty::<(&str, &str)>());

        let info = err.error_info().unwrap();
        assert_eq!(info.domain, "new.domain");
        assert_eq!(info.reason, "NEW_REASON");
        assert!(info.metadata.is_empty(), "old metadata must not survive");
        assert_eq!(
            err.detail_groups()
                .iter()
                .filter(|g| g.kind() == DetailKind::ErrorInfo)
                .count(),
            1
        );
    }

    #[test]
    fn error_info_requires_a_reason_and_defaults_the_domain() {
        let untouched =
            factory::internal("boom").with_error_info("d", "", [("ignored", "ignored")]);
        assert!(untouched.error_info().is_none());

        // Unset default domain reads as empty.
        let defaulted =
            factory::internal("boom").with_error_info("", "R", std::iter::empty::<(&str, &str)>());
        assert_eq!(
            defaulted.error_info().unwrap().domain,
            factory::default_domain()
        );
    }

    #[test]
    fn error_info_metadata_values_are_stringified() {
        let err = factory::internal("boom").with_error_info(
            "d",
            "R",
            vec![
                ("text", serde_json::json!("plain")),
                ("count", serde_json::json!(3)),
                ("flag", serde_json::json!(true)),
            ],
        );
        let metadata = &err.error_info().unwrap().metadata;
        assert_eq!(metadata["text"], "plain");
        assert_eq!(metadata["count"], "3");
        assert_eq!(metadata["flag"], "true");
    }

    #[test]
    fn debug_info_first_write_wins() {
        let err = factory::internal("boom")
            .with_debug_info("first", vec!["frame".into()])
            .with_debug_info("second", vec![]);
        assert_eq!(err.debug_info().unwrap().detail, "first");

        let untouched = factory::internal("boom").with_debug_info("", vec![]);
        assert!(untouched.debug_info().is_none());
    }

    #[test]
    fn vars_drop_empty_names_and_nulls_but_keep_duplicates() {
        let err = factory::internal("boom")
            .with_var("", "dropped")
            .with_var("n", serde_json::Value::Null)
            .with_var("attempt", 1)
            .with_var("attempt", 2);
        let names: Vec<_> = err.runtime_state().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["attempt", "attempt"]);
        assert_eq!(err.runtime_state()[0].value, serde_json::json!(1));
        assert_eq!(err.runtime_state()[1].value, serde_json::json!(2));
    }

    #[test]
    fn remove_sensitive_details_strips_exactly_the_sensitive_kinds() {
        let err = factory::invalid_argument("f", "bad")
            .with_error_info("d", "R", std::iter::empty::<(&str, &str)>())
            .with_quota_violations(vec![QuotaViolation {
                subject: "q".into(),
                description: "over".into(),
            }])
            .with_debug_info("stack", vec![])
            .remove_sensitive_details();

        let kinds: Vec<_> = err.detail_groups().iter().map(DetailGroup::kind).collect();
        assert_eq!(kinds, [DetailKind::BadRequest, DetailKind::QuotaFailure]);
    }

    #[test]
    fn hiding_details_never_affects_local_access() {
        let err = factory::invalid_argument("f", "bad").hide_details();
        assert!(err.is_details_hidden());
        assert_eq!(err.bad_request_violations().len(), 1);

        let err = err.show_details();
        assert!(!err.is_details_hidden());
    }

    #[test]
    fn domain_keys_do_not_collide_on_concatenation() {
        assert_ne!(domain_key("ab", "c"), domain_key("a", "bc"));
        let err =
            factory::internal("boom").with_error_info("d", "R", std::iter::empty::<(&str, &str)>());
        assert_eq!(err.domain_key().unwrap(), domain_key("d", "R"));
        assert!(err.is_domain_error("d", "R"));
        assert!(!err.is_domain_error("d", "OTHER"));
    }

    #[test]
    fn mutating_a_clone_leaves_the_original_intact() {
        let original = factory::invalid_argument("f", "bad");
        let _enriched = original.clone().with_var("k", "v").hide_details();
        assert!(original.runtime_state().is_empty());
        assert!(!original.is_details_hidden());
    }

    #[test]
    fn fault_collapses_opaque_errors_to_unknown() {
        let fault = Fault::opaque(std::io::Error::other("wire snapped"));
        assert!(fault.service().is_none());
        let err = fault.into_service();
        assert_eq!(err.code(), Code::Unknown);
        assert_eq!(err.message(), "wire snapped");
        assert!(err.is_details_hidden());

        let classified = Fault::from(factory::cancelled(Severity::Info));
        assert_eq!(classified.into_service().code(), Code::Cancelled);
    }

    #[test]
    fn context_layers_display_and_keeps_the_inner_error_reachable() {
        let fault = Fault::from(factory::not_implemented())
            .context("loading profile")
            .context("handling GET /users/17");

        assert_eq!(
            fault.to_string(),
            "handling GET /users/17: loading profile: NOT_IMPLEMENTED: not implemented"
        );
        assert_eq!(fault.service().unwrap().code(), Code::NotImplemented);
        // Classification sheds the context layers.
        assert_eq!(fault.into_service().message(), "not implemented");
    }

    #[test]
    fn context_on_an_opaque_fault_folds_into_the_unknown_message() {
        let fault = Fault::opaque(std::io::Error::other("wire snapped")).context("syncing ledger");
        assert!(fault.service().is_none());

        let err = fault.into_service();
        assert_eq!(err.code(), Code::Unknown);
        assert_eq!(err.message(), "syncing ledger: wire snapped");
    }

    #[test]
    fn empty_context_is_a_no_op() {
        let fault = Fault::from(factory::not_implemented()).context("");
        assert!(matches!(fault, Fault::Service(_)));
    }

    #[test]
    fn fault_vars_thread_through_context_to_the_service_error() {
        let fault = Fault::from(factory::internal("boom"))
            .context("rebuilding index")
            .with_var("shard", 4)
            .with_var("", "dropped");

        let state = fault.service().unwrap().runtime_state();
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].name, "shard");

        // No-op on opaque faults rather than an error.
        let opaque = Fault::opaque(std::io::Error::other("snap")).with_var("k", "v");
        assert!(opaque.service().is_none());
    }

    #[test]
    fn display_pairs_code_name_with_message() {
        let err = factory::not_implemented();
        assert_eq!(err.to_string(), "NOT_IMPLEMENTED: not implemented");
    }
}
