// ABOUTME: Container image reference parsing used when reporting registry errors.
// ABOUTME: Splits references like registry:5000/org/app:tag@digest into their parts.

use std::fmt;
use thiserror::Error;

/// Registry assumed when a reference has no explicit registry component.
pub const DEFAULT_REGISTRY: &str = "docker.io";

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    registry: Option<String>,
    name: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = input
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@'))
        {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        let (without_digest, digest) = match input.split_once('@') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        // A colon followed by a slash belongs to a registry port, not a tag.
        let (without_tag, tag) = match without_digest.rsplit_once(':') {
            Some((before, after)) if !after.contains('/') => (before, Some(after.to_string())),
            _ => (without_digest, None),
        };

        let (registry, name) = Self::split_registry(without_tag);

        let tag = match (&tag, &digest) {
            (None, None) => Some("latest".to_string()),
            _ => tag,
        };

        Ok(Self {
            registry,
            name,
            tag,
            digest,
        })
    }

    /// The first component is a registry if it looks like a host: it has a
    /// dot or a port, or is `localhost`.
    fn split_registry(input: &str) -> (Option<String>, String) {
        match input.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (Some(first.to_string()), rest.to_string())
            }
            _ => (None, input.to_string()),
        }
    }

    /// Registry host, falling back to [`DEFAULT_REGISTRY`].
    pub fn registry_host(&self) -> &str {
        self.registry.as_deref().unwrap_or(DEFAULT_REGISTRY)
    }

    /// Everything after the registry: `org/app:tag@digest`.
    pub fn repository(&self) -> String {
        let mut repo = self.name.clone();
        if let Some(tag) = &self.tag {
            repo.push(':');
            repo.push_str(tag);
        }
        if let Some(digest) = &self.digest {
            repo.push('@');
            repo.push_str(digest);
        }
        repo
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "{registry}/")?;
        }
        f.write_str(&self.repository())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_defaults_registry_and_tag() {
        let image = ImageRef::parse("myimg").unwrap();
        assert_eq!(image.registry, None);
        assert_eq!(image.registry_host(), "docker.io");
        assert_eq!(image.repository(), "myimg:latest");
    }

    #[test]
    fn registry_with_port_is_not_a_tag() {
        let image = ImageRef::parse("localhost:5000/team/api").unwrap();
        assert_eq!(image.registry.as_deref(), Some("localhost:5000"));
        assert_eq!(image.name, "team/api");
        assert_eq!(image.tag.as_deref(), Some("latest"));
    }

    #[test]
    fn digest_suppresses_default_tag() {
        let image = ImageRef::parse("ghcr.io/acme/app@sha256:abc").unwrap();
        assert_eq!(image.registry_host(), "ghcr.io");
        assert_eq!(image.tag, None);
        assert_eq!(image.repository(), "acme/app@sha256:abc");
    }

    #[test]
    fn org_without_dot_is_part_of_name() {
        let image = ImageRef::parse("library/nginx:1.27").unwrap();
        assert_eq!(image.registry, None);
        assert_eq!(image.name, "library/nginx");
        assert_eq!(image.to_string(), "library/nginx:1.27");
    }

    #[test]
    fn rejects_spaces() {
        assert!(matches!(
            ImageRef::parse("my image"),
            Err(ParseImageRefError::InvalidChar(' '))
        ));
    }
}
