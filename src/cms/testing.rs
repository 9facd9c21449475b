//! In-memory CMS for tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{CmsClient, CmsError, Cursor, Page, SummaryQuery};
use crate::content::{ContentSection, PostDetail, PostSummary, RichTextBlock};

/// Serves a fixed chain of pages and a set of posts
#[derive(Default)]
pub(crate) struct MemoryCms {
    pub seed: Option<Page<PostSummary>>,
    pub pages: HashMap<Cursor, Page<PostSummary>>,
    pub posts: HashMap<String, PostDetail>,
    /// Errors handed out, in order, before any real answer
    pub failures: Mutex<VecDeque<CmsError>>,
    /// Every cursor `fetch_page` was asked for
    pub fetched: Mutex<Vec<Cursor>>,
}

pub(crate) fn summary(uid: &str, title: &str) -> PostSummary {
    PostSummary {
        uid: uid.to_string(),
        first_publication_date: crate::helpers::parse_timestamp("2022-03-15T00:00:00"),
        title: title.to_string(),
        subtitle: format!("About {}", title),
        author: "Ana".to_string(),
    }
}

pub(crate) fn detail(uid: &str, title: &str, words: usize) -> PostDetail {
    let text = vec!["word"; words].join(" ");
    PostDetail {
        uid: uid.to_string(),
        first_publication_date: crate::helpers::parse_timestamp("2022-03-15T00:00:00"),
        title: title.to_string(),
        banner_url: Some("https://images.example/banner.png".to_string()),
        author: "Ana".to_string(),
        content: vec![ContentSection::new(
            "Section",
            vec![RichTextBlock::paragraph(text)],
        )],
    }
}

impl MemoryCms {
    /// Chain pages of titles: each page's cursor points at the next, the last has none
    pub fn chain(pages: &[&[&str]]) -> Self {
        let mut cms = MemoryCms::default();
        let built: Vec<Page<PostSummary>> = pages
            .iter()
            .enumerate()
            .map(|(i, titles)| {
                let results = titles
                    .iter()
                    .map(|t| summary(&t.to_lowercase(), t))
                    .collect();
                let next = (i + 1 < pages.len()).then(|| Cursor::new(format!("/page{}", i + 2)));
                Page::new(results, next)
            })
            .collect();

        for (i, page) in built.into_iter().enumerate() {
            if i == 0 {
                cms.seed = Some(page);
            } else {
                cms.pages.insert(Cursor::new(format!("/page{}", i + 1)), page);
            }
        }
        cms
    }

    pub fn with_post(mut self, post: PostDetail) -> Self {
        self.posts.insert(post.uid.clone(), post);
        self
    }

    pub fn fail_next(&self, error: CmsError) {
        self.failures.lock().unwrap().push_back(error);
    }

    fn take_failure(&self) -> Option<CmsError> {
        self.failures.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl CmsClient for MemoryCms {
    async fn query_post_summaries(
        &self,
        _query: &SummaryQuery,
    ) -> Result<Page<PostSummary>, CmsError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.seed
            .clone()
            .ok_or_else(|| CmsError::malformed("no seed page"))
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>, CmsError> {
        self.fetched.lock().unwrap().push(cursor.clone());
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.pages
            .get(cursor)
            .cloned()
            .ok_or_else(|| CmsError::fetch(cursor.as_str(), "HTTP 404 Not Found"))
    }

    async fn post_by_slug(&self, slug: &str) -> Result<PostDetail, CmsError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.posts
            .get(slug)
            .cloned()
            .ok_or_else(|| CmsError::unknown_slug(slug))
    }

    async fn list_all_slugs(&self) -> Result<Vec<String>, CmsError> {
        let mut slugs: Vec<String> = self.posts.keys().cloned().collect();
        slugs.sort();
        Ok(slugs)
    }
}
