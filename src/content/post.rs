//! Post models

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::RichTextBlock;

/// A post as the listing query returns it
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    /// Unique slug
    pub uid: String,

    /// First publication date, absent for documents the CMS never dated
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A listing entry ready for display
///
/// Only produced from a [`PostSummary`], so a date is formatted exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedPost {
    pub uid: String,

    /// Localized publication date
    pub first_publication_date: Option<String>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post as the slug query returns it
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,

    /// Banner image URL
    pub banner_url: Option<String>,

    pub author: String,

    /// Ordered content sections
    pub content: Vec<ContentSection>,
}

/// A headed section of a post body
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSection {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

impl ContentSection {
    pub fn new(heading: impl Into<String>, body: Vec<RichTextBlock>) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }
}
