//! Failures surfaced by CMS calls

use std::fmt::Display;
use thiserror::Error;

/// Everything that can go wrong talking to the CMS
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmsError {
    /// Network error or non-2xx answer
    #[error("failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    /// The body could not be decoded or lacks expected fields
    #[error("malformed CMS response: {reason}")]
    MalformedResponse { reason: String },

    /// The client cannot be built from the given settings
    #[error("invalid CMS configuration: {reason}")]
    InvalidConfig { reason: String },

    /// No document carries the requested slug
    #[error("no post found for slug `{slug}`")]
    UnknownSlug { slug: String },
}

impl CmsError {
    pub fn fetch(url: impl Into<String>, reason: impl Display) -> Self {
        Self::FetchFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(reason: impl Display) -> Self {
        Self::MalformedResponse {
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(reason: impl Display) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }

    pub fn unknown_slug(slug: impl Into<String>) -> Self {
        Self::UnknownSlug { slug: slug.into() }
    }

    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CmsError::fetch("https://cms/next", "HTTP 503").is_retryable());
        assert!(!CmsError::malformed("missing field `title`").is_retryable());
        assert!(!CmsError::unknown_slug("nope").is_retryable());
        assert!(!CmsError::invalid_config("endpoint is empty").is_retryable());
    }

    #[test]
    fn test_messages() {
        let err = CmsError::fetch("https://cms/next", "HTTP 503 Service Unavailable");
        assert_eq!(
            err.to_string(),
            "failed to fetch https://cms/next: HTTP 503 Service Unavailable"
        );
        assert_eq!(
            CmsError::unknown_slug("hello").to_string(),
            "no post found for slug `hello`"
        );
    }
}
