//! Prismic REST API v2 client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::response::{ApiInfo, SearchResponse};
use super::{CmsClient, CmsError, Cursor, Page, SummaryQuery};
use crate::config::CmsConfig;
use crate::content::{PostDetail, PostSummary};

/// Largest page size the search endpoint accepts
const MAX_PAGE_SIZE: usize = 100;

/// Queries a Prismic repository over HTTP
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
    document_type: String,
    /// Resolved on first use and kept for the client's lifetime
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    /// Create a client for the configured repository
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
            return Err(CmsError::invalid_config(format!(
                "endpoint `{}` is not an http(s) URL",
                config.endpoint
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CmsError::invalid_config)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config
                .access_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
            document_type: config.document_type.clone(),
            master_ref: OnceCell::new(),
        })
    }

    /// GET a URL and decode its JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, CmsError> {
        tracing::debug!("GET {} {:?}", url, query);

        let mut request = self.http.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CmsError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::fetch(url, format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CmsError::fetch(url, e))?;
        serde_json::from_str(&body).map_err(|e| CmsError::malformed(format!("{}: {}", url, e)))
    }

    fn token_params(&self) -> Vec<(&'static str, String)> {
        self.access_token
            .iter()
            .map(|token| ("access_token", token.clone()))
            .collect()
    }

    async fn master_ref(&self) -> Result<&str, CmsError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let info: ApiInfo = self.get_json(&self.endpoint, &self.token_params()).await?;
                let reference = info.master_ref()?;
                tracing::debug!("Using master ref {}", reference);
                Ok::<_, CmsError>(reference)
            })
            .await?;
        Ok(reference.as_str())
    }

    /// Run a predicate query against the documents search endpoint
    async fn search(
        &self,
        predicate: String,
        page_size: usize,
        fields: &[String],
    ) -> Result<SearchResponse, CmsError> {
        let reference = self.master_ref().await?.to_string();

        let mut query = vec![
            ("ref", reference),
            ("q", format!("[{}]", predicate)),
            ("pageSize", page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
        ];
        if !fields.is_empty() {
            let fetch = fields
                .iter()
                .map(|f| format!("{}.{}", self.document_type, f))
                .collect::<Vec<_>>()
                .join(",");
            query.push(("fetch", fetch));
        }
        query.extend(self.token_params());

        let url = format!("{}/documents/search", self.endpoint);
        self.get_json(&url, &query).await
    }

    fn type_predicate(&self) -> String {
        format!("[at(document.type,\"{}\")]", self.document_type)
    }
}

#[async_trait]
impl CmsClient for PrismicClient {
    async fn query_post_summaries(
        &self,
        query: &SummaryQuery,
    ) -> Result<Page<PostSummary>, CmsError> {
        self.search(self.type_predicate(), query.page_size, &query.fields)
            .await?
            .into_summary_page()
    }

    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>, CmsError> {
        let response: SearchResponse = self.get_json(cursor.as_str(), &[]).await?;
        response.into_summary_page()
    }

    async fn post_by_slug(&self, slug: &str) -> Result<PostDetail, CmsError> {
        let predicate = format!(
            "[at(my.{}.uid,\"{}\")]",
            self.document_type,
            slug.replace('"', "\\\"")
        );
        let response = self.search(predicate, 1, &[]).await?;

        match response.results.into_iter().next() {
            Some(document) => document.into_detail(),
            None => Err(CmsError::unknown_slug(slug)),
        }
    }

    async fn list_all_slugs(&self) -> Result<Vec<String>, CmsError> {
        let fields = vec!["title".to_string()];
        let mut response = self
            .search(self.type_predicate(), MAX_PAGE_SIZE, &fields)
            .await?;
        let mut slugs = Vec::new();

        loop {
            for document in response.results {
                match document.uid {
                    Some(uid) => slugs.push(uid),
                    None => tracing::warn!("Skipping post without uid"),
                }
            }
            let Some(next) = response.next_page else {
                break;
            };
            response = self.get_json(&next, &[]).await?;
        }

        tracing::debug!("CMS lists {} slugs", slugs.len());
        Ok(slugs)
    }
}
