//! End-to-end boundary tests: the same classified error rendered at the RPC
//! and HTTP edges, with redaction applied at both.

use rampart_errors::{factory, grpc, http, Code, Fault, ResourceInfo, Severity};
use tonic_types::StatusExt;

fn user_not_found() -> rampart_errors::ServiceError {
    factory::not_found(ResourceInfo {
        resource_type: "example.v1.User".into(),
        resource_name: "users/17".into(),
        owner: String::new(),
        description: "no such user".into(),
    })
}

// ============================================================================
// HTTP EDGE
// ============================================================================

#[test]
fn not_found_becomes_a_404_with_the_resource_in_the_body() {
    let response = http::respond(user_not_found());
    assert_eq!(response.status().as_u16(), 404);

    let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
    let error = &body["error"];
    assert_eq!(error["code"], 404);
    assert_eq!(error["status"], "NOT_FOUND");
    assert_eq!(error["message"], "requested resource not found");
    assert_eq!(
        error["details"][0]["@type"],
        "type.googleapis.com/google.rpc.ResourceInfo"
    );
    assert_eq!(error["details"][0]["resourceName"], "users/17");
    assert_eq!(error["details"][0]["resourceType"], "example.v1.User");
}

#[test]
fn client_cancellation_becomes_a_499() {
    let response = http::respond(factory::cancelled(Severity::Info));
    assert_eq!(response.status().as_u16(), 499);

    let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
    assert_eq!(body["error"]["status"], "CANCELLED");
    assert_eq!(body["error"]["message"], "request cancelled by the client");
}

#[test]
fn hidden_errors_render_without_error_info_or_debug_info() {
    let err = user_not_found()
        .with_error_info("auth.example.com", "USER_MISSING", [("lookup", "by-id")])
        .with_debug_info("lookup path", vec!["users table".into()])
        .hide_details();

    let response = http::respond(err);
    let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
    let rendered = body["error"]["details"].to_string();
    assert!(!rendered.contains("ErrorInfo"), "ErrorInfo leaked: {rendered}");
    assert!(!rendered.contains("DebugInfo"), "DebugInfo leaked: {rendered}");
    assert!(!rendered.contains("USER_MISSING"), "reason leaked: {rendered}");
    // The non-sensitive resource descriptor stays.
    assert!(rendered.contains("users/17"));
}

// ============================================================================
// RPC EDGE
// ============================================================================

#[test]
fn rpc_round_trip_preserves_code_message_and_detail_groups() {
    let original = user_not_found()
        .with_error_info("auth.example.com", "USER_MISSING", [("lookup", "by-id")])
        .with_quota_violations(vec![rampart_errors::QuotaViolation {
            subject: "lookups per minute".into(),
            description: "burst exceeded".into(),
        }]);

    let status = grpc::into_status(original.clone());
    assert_eq!(status.code(), tonic::Code::NotFound);
    assert_eq!(status.message(), original.message());

    let decoded = grpc::from_status(&status);
    assert_eq!(decoded.code(), Code::NotFound);
    assert_eq!(decoded.message(), original.message());
    assert_eq!(decoded.detail_groups(), original.detail_groups());
    assert!(decoded.is_domain_error("auth.example.com", "USER_MISSING"));
}

#[test]
fn intercept_redacts_hidden_errors_on_the_way_out() {
    let result: Result<(), _> = Err(factory::internal("pool poisoned")
        .show_details()
        .with_error_info("db.example.com", "POOL_POISONED", factory::no_metadata())
        .hide_details());

    let status = grpc::intercept(result).unwrap_err();
    assert_eq!(status.code(), tonic::Code::Internal);
    assert!(status.get_error_details_vec().is_empty());

    // The local value kept its details; only the wire form was stripped.
}

#[test]
fn opaque_faults_reach_each_edge_as_unclassified_500s() {
    let status = grpc::fault_to_status(Fault::opaque(std::io::Error::other("wire snapped")));
    assert_eq!(status.code(), tonic::Code::Unknown);
    assert_eq!(status.message(), "wire snapped");
    assert!(status.get_error_details_vec().is_empty());

    let response = http::respond_fault(Fault::opaque(std::io::Error::other("wire snapped")));
    assert_eq!(response.status().as_u16(), 500);
    assert!(response.body().is_empty());
}

#[test]
fn service_faults_render_like_their_inner_error() {
    let fault = Fault::from(user_not_found());
    let response = http::respond_fault(fault);
    assert_eq!(response.status().as_u16(), 404);
}

#[test]
fn context_layers_change_nothing_at_the_edges() {
    // Classified under context: still rendered from the inner error.
    let fault = Fault::from(user_not_found()).context("loading profile");
    let response = http::respond_fault(fault);
    assert_eq!(response.status().as_u16(), 404);

    let status = grpc::fault_to_status(Fault::from(user_not_found()).context("loading profile"));
    assert_eq!(status.code(), tonic::Code::NotFound);
    assert_eq!(status.message(), "requested resource not found");

    // Opaque under context: the context folds into the UNKNOWN message on
    // the RPC edge and leaks nothing on the HTTP edge.
    let status = grpc::fault_to_status(
        Fault::opaque(std::io::Error::other("wire snapped")).context("syncing ledger"),
    );
    assert_eq!(status.code(), tonic::Code::Unknown);
    assert_eq!(status.message(), "syncing ledger: wire snapped");

    let response = http::respond_fault(
        Fault::opaque(std::io::Error::other("wire snapped")).context("syncing ledger"),
    );
    assert_eq!(response.status().as_u16(), 500);
    assert!(response.body().is_empty());
}
