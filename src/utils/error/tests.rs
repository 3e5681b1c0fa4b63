//! Tests for error mapping

use super::types::RbacError;
use reqwest::StatusCode;

#[test]
fn test_message_field_is_propagated() {
    let err = RbacError::from_response_body(
        StatusCode::CONFLICT,
        r#"{"message":"permission is still granted to 2 roles"}"#,
    );
    match err {
        RbacError::Conflict(msg) => assert_eq!(msg, "permission is still granted to 2 roles"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_status_mapping() {
    assert!(matches!(
        RbacError::from_response_body(StatusCode::BAD_REQUEST, "{}"),
        RbacError::Validation(_)
    ));
    assert!(matches!(
        RbacError::from_response_body(StatusCode::UNAUTHORIZED, ""),
        RbacError::Auth(_)
    ));
    assert!(matches!(
        RbacError::from_response_body(StatusCode::NOT_FOUND, ""),
        RbacError::NotFound { .. }
    ));
    assert!(matches!(
        RbacError::from_response_body(StatusCode::GATEWAY_TIMEOUT, ""),
        RbacError::Timeout(_)
    ));
    assert!(matches!(
        RbacError::from_response_body(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
        RbacError::Api { status: 500, .. }
    ));
}

#[test]
fn test_empty_body_falls_back_to_reason_phrase() {
    match RbacError::from_response_body(StatusCode::FORBIDDEN, "") {
        RbacError::Forbidden(msg) => assert_eq!(msg, "Forbidden"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_plain_text_body_is_kept() {
    match RbacError::from_response_body(StatusCode::UNPROCESSABLE_ENTITY, "bad niveau\n") {
        RbacError::Validation(msg) => assert_eq!(msg, "bad niveau"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_retryability() {
    assert!(RbacError::timeout("slow").is_retryable());
    assert!(
        RbacError::Api {
            status: 503,
            message: "down".into()
        }
        .is_retryable()
    );
    assert!(!RbacError::conflict("in use").is_retryable());
    assert!(!RbacError::validation("bad").is_retryable());
}

#[test]
fn test_client_error_classification() {
    assert!(RbacError::validation("bad").is_client_error());
    assert!(RbacError::cycle("a -> b -> a").is_client_error());
    assert!(!RbacError::timeout("slow").is_client_error());
    assert!(!RbacError::config("missing").is_client_error());
    assert_eq!(RbacError::immutable("system").status_code(), 423);
}
