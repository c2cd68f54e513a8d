// ABOUTME: Classification of registry and build-service errors relayed by the control plane.
// ABOUTME: Maps raw error text to a user-facing message and tells transient failures apart.

use std::fmt;

use crate::types::{DEFAULT_REGISTRY, ImageRef};

/// Category of a registry/build failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Logged in, but not allowed to push to the repository.
    AuthDenied,
    /// Missing or invalid registry credentials.
    Unauthenticated,
    /// The build/push backend could not be reached.
    ServiceUnavailable,
    /// Anything the rule table does not recognize.
    Unknown,
}

/// A classified error: kind, message and an optional remediation hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassification {
    pub kind: ErrorKind,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ErrorClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n    {hint}")?;
        }
        Ok(())
    }
}

/// A rule matches when any of its alternatives has all of its substrings present.
struct Rule {
    kind: ErrorKind,
    any_of: &'static [&'static [&'static str]],
}

impl Rule {
    fn matches(&self, text: &str) -> bool {
        self.any_of
            .iter()
            .any(|all| all.iter().all(|needle| text.contains(needle)))
    }
}

// Evaluated top to bottom; the first match wins.
const RULES: &[Rule] = &[
    Rule {
        kind: ErrorKind::AuthDenied,
        any_of: &[&["insufficient_scope: authorization failed"]],
    },
    Rule {
        kind: ErrorKind::Unauthenticated,
        any_of: &[
            &["failed to authorize: failed to fetch anonymous token"],
            &["UNAUTHORIZED: authentication required"],
        ],
    },
    Rule {
        kind: ErrorKind::ServiceUnavailable,
        any_of: &[
            &["connect: connection refused"],
            &["500 Internal Server Error"],
            &["context canceled"],
        ],
    },
];

// Each row lists substrings that must all be present.
const TRANSIENT_PATTERNS: &[&[&str]] = &[
    &["failed commit on ref", "500 Internal Server Error"],
    &["transport is closing"],
    &["transport: error while dialing: dial tcp: i/o timeout"],
    &["error reading from server: EOF"],
    &["error while dialing: dial tcp: lookup buildkit", "no such host"],
    &["failed commit on ref", "400 Bad Request"],
    &["failed to do request", "http: server closed idle connection"],
    &["failed to do request", "tls: use of closed connection"],
    &["Canceled", "the client connection is closing"],
    &["Canceled", "context canceled"],
];

/// Kind of the first rule matching `text`.
pub fn kind_of(text: &str) -> ErrorKind {
    RULES
        .iter()
        .find(|rule| rule.matches(text))
        .map_or(ErrorKind::Unknown, |rule| rule.kind)
}

/// Classify a raw error produced while building or pushing `tag`.
pub fn classify(text: &str, tag: &str) -> ErrorClassification {
    let (registry, repository) = registry_and_repository(tag);
    let kind = kind_of(text);

    let (message, hint) = match kind {
        ErrorKind::AuthDenied => (
            not_authorized(tag, &repository),
            Some(format!(
                "Please log in into the registry '{registry}' with a user with push permissions to '{repository}' or use another image."
            )),
        ),
        ErrorKind::Unauthenticated => (
            not_authorized(tag, &repository),
            Some(format!(
                "Log in into the registry '{registry}' and verify that you have permissions to push the image '{repository}'."
            )),
        ),
        ErrorKind::ServiceUnavailable => (
            "buildkit service is not available at the moment".to_string(),
            Some("Please try again later.".to_string()),
        ),
        ErrorKind::Unknown => (format!("error building image '{tag}': {text}"), None),
    };

    ErrorClassification {
        kind,
        message,
        hint,
    }
}

fn not_authorized(tag: &str, repository: &str) -> String {
    format!("error building image '{tag}': You are not authorized to push image '{repository}'")
}

/// Whether `text` describes a network condition worth retrying.
pub fn is_transient(text: &str) -> bool {
    TRANSIENT_PATTERNS
        .iter()
        .any(|all| all.iter().all(|needle| text.contains(needle)))
}

/// Split an image tag into registry host and repository path.
///
/// Tags that do not parse as image references are reported against the
/// default registry unchanged.
pub fn registry_and_repository(tag: &str) -> (String, String) {
    match ImageRef::parse(tag) {
        Ok(image) => (image.registry_host().to_string(), image.repository()),
        Err(_) => (DEFAULT_REGISTRY.to_string(), tag.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_scope_is_auth_denied() {
        let c = classify("insufficient_scope: authorization failed", "myimg:latest");
        assert_eq!(c.kind, ErrorKind::AuthDenied);
        assert!(c.message.contains("myimg:latest"));
        assert!(c.hint.as_deref().unwrap().contains("'docker.io'"));
    }

    #[test]
    fn anonymous_token_failure_is_unauthenticated() {
        let c = classify(
            "failed to authorize: failed to fetch anonymous token: 401",
            "registry.acme.dev/team/api:v2",
        );
        assert_eq!(c.kind, ErrorKind::Unauthenticated);
        assert_eq!(
            c.hint.as_deref(),
            Some(
                "Log in into the registry 'registry.acme.dev' and verify that you have permissions to push the image 'team/api:v2'."
            )
        );
    }

    #[test]
    fn connection_refused_hides_details() {
        let c = classify("dial tcp 10.0.0.1:1234: connect: connection refused", "x:1");
        assert_eq!(c.kind, ErrorKind::ServiceUnavailable);
        assert!(!c.message.contains("10.0.0.1"));
        assert_eq!(c.hint.as_deref(), Some("Please try again later."));
    }

    #[test]
    fn auth_rule_wins_over_service_rule() {
        let text = "insufficient_scope: authorization failed (500 Internal Server Error)";
        assert_eq!(kind_of(text), ErrorKind::AuthDenied);
    }

    #[test]
    fn unknown_embeds_original_text() {
        let c = classify("manifest invalid", "app:dev");
        assert_eq!(c.kind, ErrorKind::Unknown);
        assert_eq!(c.message, "error building image 'app:dev': manifest invalid");
        assert_eq!(c.hint, None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(kind_of("Connect: Connection Refused"), ErrorKind::Unknown);
        assert!(!is_transient("TRANSPORT IS CLOSING"));
    }

    #[test]
    fn transient_requires_every_substring() {
        assert!(is_transient(
            "failed commit on ref \"layer\": unexpected status: 500 Internal Server Error"
        ));
        assert!(!is_transient("failed commit on ref \"layer\""));
        assert!(is_transient("rpc error: code = Canceled desc = context canceled"));
        assert!(!is_transient("context canceled"));
    }

    #[test]
    fn display_includes_hint() {
        let c = classify("connect: connection refused", "a");
        assert_eq!(
            c.to_string(),
            "buildkit service is not available at the moment\n    Please try again later."
        );
    }
}
