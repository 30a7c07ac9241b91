//! Image reference construction and parsing
//!
//! A [`Reference`] is the fully-qualified name of one tagged image,
//! `registry/namespace/image:tag`. Empty registry and namespace segments are
//! legal (the implicit default registry) and are omitted when the reference
//! is rendered, so a reference never starts with a `/`.

use std::fmt;

use crate::error::{PromoterError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub registry: String,
    pub namespace: String,
    pub image: String,
    pub tag: String,
}

impl Reference {
    pub fn new(registry: &str, namespace: &str, image: &str, tag: &str) -> Self {
        Self {
            registry: registry.to_string(),
            namespace: namespace.to_string(),
            image: image.to_string(),
            tag: tag.to_string(),
        }
    }

    /// The reference without its tag, e.g. `registry.example.com/team/api`.
    pub fn repository(&self) -> String {
        let mut repository = String::new();
        for segment in [&self.registry, &self.namespace, &self.image] {
            if segment.is_empty() {
                continue;
            }
            if !repository.is_empty() {
                repository.push('/');
            }
            repository.push_str(segment);
        }
        repository
    }

    /// Parse a rendered reference back into its components.
    ///
    /// The first path segment is only treated as a registry when it contains
    /// a `.` or a `:` (e.g. `ghcr.io`, `localhost:5000`); a trailing
    /// `:digits` after the last `/` is a port, not a tag.
    pub fn parse(reference: &str) -> Result<Self> {
        let (repository, tag) = split_repository_tag(reference);
        if repository.is_empty() {
            return Err(PromoterError::Validation(format!(
                "invalid image reference: {}",
                reference
            )));
        }

        let mut segments: Vec<&str> = repository.split('/').collect();
        let registry = if segments.len() > 1 && (segments[0].contains('.') || segments[0].contains(':')) {
            segments.remove(0)
        } else {
            ""
        };
        let image = segments.pop().unwrap_or_default();
        if image.is_empty() {
            return Err(PromoterError::Validation(format!(
                "invalid image reference: {}",
                reference
            )));
        }
        let namespace = segments.join("/");

        Ok(Self {
            registry: registry.to_string(),
            namespace,
            image: image.to_string(),
            tag: tag.to_string(),
        })
    }

    /// Whether two references name the same (repository, tag) pair.
    pub fn same_image(&self, other: &Reference) -> bool {
        self.repository() == other.repository() && self.tag == other.tag
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository(), self.tag)
    }
}

/// Split a reference into repository and tag at the last `:`.
///
/// A candidate tag that contains a `/` or is all digits belongs to a
/// registry host (`localhost:5000/app`), not to the image.
fn split_repository_tag(reference: &str) -> (&str, &str) {
    if let Some(pos) = reference.rfind(':') {
        let candidate = &reference[pos + 1..];
        if !candidate.is_empty()
            && !candidate.contains('/')
            && !candidate.chars().all(|c| c.is_ascii_digit())
        {
            return (&reference[..pos], candidate);
        }
    }
    (reference, "latest")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full_reference() {
        let reference = Reference::new("registry.example.com", "team", "api", "v2");
        assert_eq!(reference.to_string(), "registry.example.com/team/api:v2");
    }

    #[test]
    fn test_display_without_registry() {
        let reference = Reference::new("", "team", "api", "v1");
        assert_eq!(reference.to_string(), "team/api:v1");
        assert!(!reference.to_string().starts_with('/'));
    }

    #[test]
    fn test_display_without_registry_and_namespace() {
        let reference = Reference::new("", "", "api", "v1");
        assert_eq!(reference.to_string(), "api:v1");
    }

    #[test]
    fn test_parse_round_trip() {
        let built = Reference::new("registry.example.com", "team", "api", "v2");
        let parsed = Reference::parse(&built.to_string()).unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_parse_round_trip_without_registry() {
        let built = Reference::new("", "team", "api", "v1");
        let parsed = Reference::parse(&built.to_string()).unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_parse_registry_with_port() {
        let parsed = Reference::parse("localhost:5000/app:dev").unwrap();
        assert_eq!(parsed.registry, "localhost:5000");
        assert_eq!(parsed.namespace, "");
        assert_eq!(parsed.image, "app");
        assert_eq!(parsed.tag, "dev");
    }

    #[test]
    fn test_parse_registry_with_port_and_no_tag() {
        let parsed = Reference::parse("localhost:5000/app").unwrap();
        assert_eq!(parsed.registry, "localhost:5000");
        assert_eq!(parsed.image, "app");
        assert_eq!(parsed.tag, "latest");
    }

    #[test]
    fn test_parse_nested_namespace() {
        let parsed = Reference::parse("ghcr.io/org/group/app:v1").unwrap();
        assert_eq!(parsed.registry, "ghcr.io");
        assert_eq!(parsed.namespace, "org/group");
        assert_eq!(parsed.image, "app");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Reference::parse("").is_err());
        assert!(Reference::parse(":v1").is_err());
    }

    #[test]
    fn test_same_image_is_exact() {
        let wanted = Reference::new("", "team", "api", "v1");
        // A repository that merely contains the wanted name is not a match.
        let other = Reference::parse("team/myapi:v1").unwrap();
        assert!(!wanted.same_image(&other));
        let held = Reference::parse("team/api:v1").unwrap();
        assert!(wanted.same_image(&held));
    }

    #[test]
    fn test_same_image_differs_by_tag() {
        let v1 = Reference::new("", "team", "api", "v1");
        let v2 = Reference::new("", "team", "api", "v2");
        assert!(!v1.same_image(&v2));
    }
}
