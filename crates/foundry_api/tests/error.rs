use foundry_api::error::parse_error_message;
use foundry_api::FoundryApiError;
use reqwest::StatusCode;

#[test]
fn structured_error_bodies_render_code_and_message() {
    let body = r#"{"error":{"code":"rate_limit_exceeded","message":"Too many requests"}}"#;
    assert_eq!(
        parse_error_message(StatusCode::TOO_MANY_REQUESTS, body),
        "rate_limit_exceeded: Too many requests"
    );
}

#[test]
fn message_only_bodies_render_the_message() {
    let body = r#"{"error":{"message":"thread not found"}}"#;
    assert_eq!(
        parse_error_message(StatusCode::NOT_FOUND, body),
        "thread not found"
    );
}

#[test]
fn unstructured_bodies_fall_back_to_the_raw_body() {
    assert_eq!(
        parse_error_message(StatusCode::BAD_GATEWAY, "upstream connect error"),
        "upstream connect error"
    );
}

#[test]
fn empty_bodies_fall_back_to_the_canonical_reason() {
    assert_eq!(
        parse_error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
        "Service Unavailable"
    );
}

#[test]
fn auth_errors_are_flagged_for_callers() {
    let auth = FoundryApiError::Auth(StatusCode::UNAUTHORIZED, "bad token".to_string());
    assert!(auth.is_auth());

    let status = FoundryApiError::Status(StatusCode::BAD_REQUEST, "nope".to_string());
    assert!(!status.is_auth());
}

#[test]
fn retry_exhausted_display_names_the_operation_and_attempts() {
    let error = FoundryApiError::RetryExhausted {
        operation: "message send",
        attempts: 3,
        last_error: Some("503".to_string()),
    };
    assert_eq!(
        error.to_string(),
        "message send failed after 3 attempts (last error: 503)"
    );
}
