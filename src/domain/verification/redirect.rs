//! Where the callback sends the visitor once verification finishes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// A same-site relative path the visitor is returned to after the callback.
///
/// Only paths starting with a single `/` are accepted, so a crafted
/// `return_to` cannot bounce the visitor to another host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// Validates and wraps a relative path.
    pub fn new(path: impl Into<String>) -> Result<Self, ValidationError> {
        let path = path.into();
        if path.is_empty() {
            return Err(ValidationError::empty_field("redirect_target"));
        }
        if !path.starts_with('/') || path.starts_with("//") || path.starts_with("/\\") {
            return Err(ValidationError::invalid_format(
                "redirect_target",
                "must be a same-site relative path",
            ));
        }
        if path.chars().any(|c| c.is_control()) {
            return Err(ValidationError::invalid_format(
                "redirect_target",
                "must not contain control characters",
            ));
        }
        Ok(Self(path))
    }

    /// Returns the path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RedirectTarget {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RedirectTarget> for String {
    fn from(target: RedirectTarget) -> Self {
        target.0
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_relative_paths_with_query() {
        let target = RedirectTarget::new("/checkout?step=payment").unwrap();
        assert_eq!(target.as_str(), "/checkout?step=payment");
    }

    #[test]
    fn rejects_absolute_urls() {
        assert!(RedirectTarget::new("https://evil.example/checkout").is_err());
    }

    #[test]
    fn rejects_protocol_relative_urls() {
        assert!(RedirectTarget::new("//evil.example/checkout").is_err());
        assert!(RedirectTarget::new("/\\evil.example").is_err());
    }

    #[test]
    fn rejects_empty_and_header_injection() {
        assert!(RedirectTarget::new("").is_err());
        assert!(RedirectTarget::new("/checkout\r\nSet-Cookie: x=1").is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<RedirectTarget, _> = serde_json::from_str("\"/cart\"");
        assert!(ok.is_ok());
        let bad: Result<RedirectTarget, _> = serde_json::from_str("\"http://x\"");
        assert!(bad.is_err());
    }
}
