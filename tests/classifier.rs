// ABOUTME: Integration tests for registry error classification and the transient predicate.
// ABOUTME: Checks the documented examples and that classification is deterministic.

use pipedeploy::registry::{ErrorKind, classify, is_transient};
use proptest::prelude::*;

#[test]
fn insufficient_scope_names_pushed_tag() {
    let c = classify("insufficient_scope: authorization failed", "myimg:latest");

    assert_eq!(c.kind, ErrorKind::AuthDenied);
    assert_eq!(
        c.message,
        "error building image 'myimg:latest': You are not authorized to push image 'myimg:latest'"
    );
}

#[test]
fn connection_refused_is_retry_later() {
    let c = classify(
        "failed to dial gRPC: connect: connection refused",
        "ghcr.io/acme/api:2",
    );

    assert_eq!(c.kind, ErrorKind::ServiceUnavailable);
    assert!(!c.to_string().contains("gRPC"));
    assert!(c.to_string().ends_with("Please try again later."));
}

#[test]
fn retryable_network_conditions() {
    for text in [
        "rpc error: code = Unavailable desc = transport is closing",
        "failed to do request: Head \"https://r\": http: server closed idle connection",
        "failed to do request: tls: use of closed connection",
        "dial tcp: lookup buildkit on 10.0.0.2:53: no such host (error while dialing: dial tcp: lookup buildkit)",
        "rpc error: code = Canceled desc = grpc: the client connection is closing",
    ] {
        assert!(is_transient(text), "{text}");
    }
    assert!(!is_transient("manifest unknown"));
}

proptest! {
    #[test]
    fn classification_is_deterministic(
        text in ".{0,80}",
        tag in "[a-z]{1,8}(/[a-z]{1,8})?:[a-z0-9]{1,5}",
    ) {
        prop_assert_eq!(classify(&text, &tag), classify(&text, &tag));
        prop_assert_eq!(is_transient(&text), is_transient(&text));
    }

    #[test]
    fn unknown_always_mentions_tag(text in "[a-z ]{0,40}", tag in "[a-z]{1,8}:[0-9]{1,3}") {
        let c = classify(&text, &tag);
        if c.kind == ErrorKind::Unknown {
            prop_assert!(c.message.contains(&tag));
            prop_assert!(c.message.contains(&text));
        }
    }
}
