//! Prismic REST API v2 wire format and its conversion to post models

use serde::Deserialize;

use super::{CmsError, Cursor, Page};
use crate::content::{ContentSection, PostDetail, PostSummary, RichTextBlock};
use crate::helpers::parse_timestamp;

/// `GET /api/v2`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    /// Ref of the published content
    pub fn master_ref(&self) -> Result<String, CmsError> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .or_else(|| self.refs.iter().find(|r| r.id == "master"))
            .map(|r| r.reference.clone())
            .ok_or_else(|| CmsError::malformed("API answer lists no master ref"))
    }
}

/// `GET /api/v2/documents/search` and every `next_page` URL
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub results: Vec<Document>,
    #[serde(default)]
    pub next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Document {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Deserialize)]
struct SummaryData {
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    author: Option<String>,
}

#[derive(Deserialize)]
struct DetailData {
    title: Option<String>,
    #[serde(default)]
    banner: Option<Banner>,
    #[serde(default)]
    author: Option<String>,
    content: Option<Vec<SectionData>>,
}

#[derive(Deserialize)]
struct Banner {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct SectionData {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    body: Vec<RichTextBlock>,
}

impl SearchResponse {
    pub fn into_summary_page(self) -> Result<Page<PostSummary>, CmsError> {
        let results = self
            .results
            .into_iter()
            .map(Document::into_summary)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(results, self.next_page.map(Cursor::new)))
    }
}

impl Document {
    fn uid(&self) -> Result<String, CmsError> {
        self.uid
            .clone()
            .ok_or_else(|| CmsError::malformed("document has no uid"))
    }

    fn publication_date(&self) -> Result<Option<chrono::DateTime<chrono::FixedOffset>>, CmsError> {
        match self.first_publication_date.as_deref() {
            None => Ok(None),
            Some(raw) => parse_timestamp(raw).map(Some).ok_or_else(|| {
                CmsError::malformed(format!("unparseable first_publication_date `{}`", raw))
            }),
        }
    }

    pub fn into_summary(self) -> Result<PostSummary, CmsError> {
        let uid = self.uid()?;
        let first_publication_date = self.publication_date()?;
        let data: SummaryData = serde_json::from_value(self.data)
            .map_err(|e| CmsError::malformed(format!("post `{}`: {}", uid, e)))?;
        let title = data
            .title
            .ok_or_else(|| CmsError::malformed(format!("post `{}` has no title", uid)))?;

        Ok(PostSummary {
            uid,
            first_publication_date,
            title,
            subtitle: data.subtitle.unwrap_or_default(),
            author: data.author.unwrap_or_default(),
        })
    }

    pub fn into_detail(self) -> Result<PostDetail, CmsError> {
        let uid = self.uid()?;
        let first_publication_date = self.publication_date()?;
        let data: DetailData = serde_json::from_value(self.data)
            .map_err(|e| CmsError::malformed(format!("post `{}`: {}", uid, e)))?;
        let title = data
            .title
            .ok_or_else(|| CmsError::malformed(format!("post `{}` has no title", uid)))?;
        let content = data
            .content
            .ok_or_else(|| CmsError::malformed(format!("post `{}` has no content", uid)))?;

        Ok(PostDetail {
            uid,
            first_publication_date,
            title,
            banner_url: data.banner.and_then(|b| b.url),
            author: data.author.unwrap_or_default(),
            content: content
                .into_iter()
                .map(|s| ContentSection::new(s.heading.unwrap_or_default(), s.body))
                .collect(),
        })
    }
}
