//! Post detail view

use serde::Serialize;

use crate::cms::{CmsClient, CmsError};
use crate::content::richtext::as_html;
use crate::content::PostDetail;
use crate::helpers::{date_xml, format_publication_date, reading_time};
use crate::i18n::Locale;

/// Settings that shape how a post is displayed
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub locale: Locale,
    pub words_per_minute: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            words_per_minute: crate::helpers::DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

/// Where a slug lookup stands
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PostLookup {
    /// Not resolved yet
    #[default]
    Loading,
    Found(Box<PostPage>),
    /// The CMS has no post with this slug
    NotFound { slug: String },
}

impl PostLookup {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn page(&self) -> Option<&PostPage> {
        match self {
            Self::Found(page) => Some(page),
            _ => None,
        }
    }
}

/// A post ready for the template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPage {
    pub uid: String,
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    /// Machine-readable date for `<time datetime>`
    pub published_at: Option<String>,
    /// Localized date for display
    pub formatted_date: Option<String>,
    /// Estimated minutes to read
    pub reading_time: usize,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub heading: String,
    pub html: String,
}

impl PostPage {
    pub fn from_detail(detail: PostDetail, settings: &RenderSettings) -> Self {
        let reading_time = reading_time(&detail.content, settings.words_per_minute);

        Self {
            published_at: detail.first_publication_date.as_ref().map(date_xml),
            formatted_date: detail
                .first_publication_date
                .as_ref()
                .map(|date| format_publication_date(date, settings.locale)),
            reading_time,
            sections: detail
                .content
                .iter()
                .map(|section| SectionView {
                    heading: section.heading.clone(),
                    html: as_html(&section.body),
                })
                .collect(),
            uid: detail.uid,
            title: detail.title,
            author: detail.author,
            banner_url: detail.banner_url,
        }
    }
}

/// Look a slug up in the CMS
///
/// A slug the CMS does not know ends in [`PostLookup::NotFound`]; every other
/// failure is returned as is.
pub async fn resolve<C: CmsClient + ?Sized>(
    client: &C,
    slug: &str,
    settings: &RenderSettings,
) -> Result<PostLookup, CmsError> {
    match client.post_by_slug(slug).await {
        Ok(detail) => Ok(PostLookup::Found(Box::new(PostPage::from_detail(
            detail, settings,
        )))),
        Err(CmsError::UnknownSlug { slug }) => {
            tracing::info!("No post for slug {}", slug);
            Ok(PostLookup::NotFound { slug })
        }
        Err(err) => Err(err),
    }
}
