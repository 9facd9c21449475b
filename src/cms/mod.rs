//! CMS module - the query contract the listing and detail views consume
//!
//! [`CmsClient`] is the seam: [`PrismicClient`] speaks the Prismic REST API,
//! tests substitute an in-memory implementation.

mod error;
mod prismic;
mod response;
#[cfg(test)]
pub(crate) mod testing;

pub use error::CmsError;
pub use prismic::PrismicClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::content::{PostDetail, PostSummary};

/// Opaque pointer to the next page of a query
///
/// The CMS hands it out as a URL. It is never parsed or rebuilt, only handed
/// back to [`CmsClient::fetch_page`] as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    /// `None` when this is the last page
    pub next_page: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, next_page: Option<Cursor>) -> Self {
        Self { results, next_page }
    }
}

/// Parameters of the listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    pub page_size: usize,
    /// Document fields to fetch, without the type prefix
    pub fields: Vec<String>,
}

impl SummaryQuery {
    pub fn new(page_size: usize, fields: Vec<String>) -> Self {
        Self { page_size, fields }
    }
}

impl From<&crate::config::CmsConfig> for SummaryQuery {
    fn from(config: &crate::config::CmsConfig) -> Self {
        Self::new(config.page_size, config.summary_fields.clone())
    }
}

/// Queries a headless CMS for blog posts
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// First page of post summaries
    async fn query_post_summaries(
        &self,
        query: &SummaryQuery,
    ) -> Result<Page<PostSummary>, CmsError>;

    /// The page a cursor points at, in the same shape as the first page
    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>, CmsError>;

    /// Full post for a slug; [`CmsError::UnknownSlug`] when there is none
    async fn post_by_slug(&self, slug: &str) -> Result<PostDetail, CmsError>;

    /// Every slug the CMS knows about
    async fn list_all_slugs(&self) -> Result<Vec<String>, CmsError>;
}

#[async_trait]
impl<T: CmsClient + ?Sized> CmsClient for &T {
    async fn query_post_summaries(
        &self,
        query: &SummaryQuery,
    ) -> Result<Page<PostSummary>, CmsError> {
        (**self).query_post_summaries(query).await
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>, CmsError> {
        (**self).fetch_page(cursor).await
    }

    async fn post_by_slug(&self, slug: &str) -> Result<PostDetail, CmsError> {
        (**self).post_by_slug(slug).await
    }

    async fn list_all_slugs(&self) -> Result<Vec<String>, CmsError> {
        (**self).list_all_slugs().await
    }
}
