//! Generator module - renders the CMS content to static HTML files

use anyhow::{Context as _, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tera::Context;

use crate::cms::{CmsClient, CmsError, SummaryQuery};
use crate::detail::{self, PostLookup, RenderSettings};
use crate::helpers::{full_url_for, listing_path, post_path, url_for};
use crate::i18n::I18n;
use crate::listing::{DateFormatter, ListingAggregator, SummaryFormatter};
use crate::templates::{
    ConfigData, ListingEntry, PaginationData, TemplateRenderer, RENDERED_POST_MARKER, STYLESHEET,
};
use crate::Blog;

/// Delay before the first retry; doubles with every further attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);
/// Upper bound on the delay between two attempts
const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// What a build produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Listing steps written (`index.html` plus one per extra page)
    pub listing_pages: usize,
    /// Posts in the fully loaded listing
    pub listed_posts: usize,
    /// Post pages written
    pub post_pages: usize,
    /// Slugs the CMS listed but could not serve
    pub missing_posts: Vec<String>,
    /// Slugs whose lookup failed, with the reason
    pub failed_posts: Vec<(String, String)>,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    i18n: I18n,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let mut i18n = I18n::new(blog.locale);
        i18n.load_overrides(blog.base_dir.join("languages"))?;

        Ok(Self {
            blog: blog.clone(),
            renderer,
            i18n,
        })
    }

    /// Generate the entire site
    pub async fn generate<C: CmsClient>(&self, client: &C) -> Result<BuildReport> {
        fs::create_dir_all(&self.blog.public_dir)?;
        self.write_assets()?;

        let mut report = BuildReport::default();
        self.generate_listing(client, &mut report).await?;
        self.generate_post_pages(client, &mut report).await?;

        Ok(report)
    }

    /// Write every step of the listing: the seed page as `index.html`, then
    /// the accumulated list after each `load_more` as `page/N/index.html`
    async fn generate_listing<C: CmsClient>(
        &self,
        client: &C,
        report: &mut BuildReport,
    ) -> Result<()> {
        let query = SummaryQuery::from(&self.blog.config.cms);

        let mut attempt = 0;
        let seed = loop {
            match client.query_post_summaries(&query).await {
                Ok(page) => break page,
                Err(err) if self.should_retry(&err, attempt) => {
                    attempt += 1;
                    self.wait_before_retry(&err, attempt).await;
                }
                Err(err) => return Err(err).context("Failed to query the first listing page"),
            }
        };

        let mut listing = ListingAggregator::new(client, DateFormatter::new(self.blog.locale));
        listing.initialize(seed);
        self.write_listing_page(&listing)?;

        while listing.has_more() {
            let mut attempt = 0;
            loop {
                match listing.load_more().await {
                    Ok(_) => break,
                    Err(err) if self.should_retry(&err, attempt) => {
                        attempt += 1;
                        self.wait_before_retry(&err, attempt).await;
                    }
                    Err(err) => {
                        return Err(err).with_context(|| {
                            format!(
                                "Failed to load listing page {}",
                                listing.pages_loaded() + 1
                            )
                        })
                    }
                }
            }
            self.write_listing_page(&listing)?;
        }

        report.listing_pages = listing.pages_loaded();
        report.listed_posts = listing.posts().len();
        tracing::info!(
            "Generated {} listing pages with {} posts",
            report.listing_pages,
            report.listed_posts
        );

        Ok(())
    }

    fn write_listing_page<C: CmsClient, F: SummaryFormatter>(
        &self,
        listing: &ListingAggregator<C, F>,
    ) -> Result<()> {
        let current = listing.pages_loaded();
        let posts: Vec<ListingEntry> = listing.posts().iter().map(ListingEntry::from).collect();
        let pagination = PaginationData {
            current,
            next_link: if listing.has_more() {
                listing_path(current + 1)
            } else {
                String::new()
            },
        };

        let mut context = self.create_base_context(&listing_path(current));
        context.insert("posts", &posts);
        context.insert("pagination", &pagination);

        let html = self.renderer.render("index.html", &context)?;
        let output_path = self
            .blog
            .public_dir
            .join(listing_path(current))
            .join("index.html");
        write_file(&output_path, &html)?;
        tracing::debug!("Generated: {:?}", output_path);

        Ok(())
    }

    /// Render every post the CMS lists
    async fn generate_post_pages<C: CmsClient>(
        &self,
        client: &C,
        report: &mut BuildReport,
    ) -> Result<()> {
        let slugs = client
            .list_all_slugs()
            .await
            .context("Failed to list post slugs")?;
        let settings = self.render_settings();

        for slug in slugs {
            match detail::resolve(client, &slug, &settings).await {
                Ok(lookup @ PostLookup::Found(_)) => match self.write_post_lookup(&slug, &lookup) {
                    Ok(_) => report.post_pages += 1,
                    Err(err) => {
                        tracing::error!("Failed to write post {}: {:#}", slug, err);
                        report.failed_posts.push((slug, format!("{:#}", err)));
                    }
                },
                Ok(_) => {
                    tracing::warn!("CMS listed {} but has no post for it", slug);
                    report.missing_posts.push(slug);
                }
                Err(err) => {
                    tracing::error!("Failed to load post {}: {}", slug, err);
                    report.failed_posts.push((slug, err.to_string()));
                }
            }
        }

        tracing::info!("Generated {} post pages", report.post_pages);
        Ok(())
    }

    /// Where the page for a slug lives
    pub fn post_output_path(&self, slug: &str) -> Result<PathBuf> {
        if slug.is_empty()
            || slug == "."
            || slug == ".."
            || slug.contains(['/', '\\'])
        {
            anyhow::bail!("Invalid post slug {:?}", slug);
        }
        Ok(self
            .blog
            .public_dir
            .join("post")
            .join(slug)
            .join("index.html"))
    }

    /// Whether the slug's page holds a rendered post, as opposed to nothing,
    /// a loading shell or a not-found page
    pub fn has_rendered_post(&self, slug: &str) -> Result<bool> {
        let path = self.post_output_path(slug)?;
        if !path.exists() {
            return Ok(false);
        }
        let html =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(html.contains(RENDERED_POST_MARKER))
    }

    /// Render a lookup to the slug's page: the loading shell, the post, or
    /// a not-found page
    pub fn write_post_lookup(&self, slug: &str, lookup: &PostLookup) -> Result<PathBuf> {
        let mut context = self.create_base_context(&post_path(slug));
        let template = match lookup {
            PostLookup::Loading => "loading.html",
            PostLookup::Found(page) => {
                context.insert("post", page.as_ref());
                "post.html"
            }
            PostLookup::NotFound { .. } => "not_found.html",
        };

        let html = self.renderer.render(template, &context)?;
        let output_path = self.post_output_path(slug)?;
        write_file(&output_path, &html)?;
        tracing::debug!("Generated post: {:?}", output_path);

        Ok(output_path)
    }

    pub fn render_settings(&self) -> RenderSettings {
        self.blog.render_settings()
    }

    /// Stylesheet and the site-wide 404 page
    fn write_assets(&self) -> Result<()> {
        write_file(&self.blog.public_dir.join("css/style.css"), STYLESHEET)?;

        let html = self
            .renderer
            .render("not_found.html", &self.create_base_context("404.html"))?;
        write_file(&self.blog.public_dir.join("404.html"), &html)?;

        Ok(())
    }

    /// Context shared by every page; `path` is the page's site-relative path
    fn create_base_context(&self, path: &str) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert("canonical", &full_url_for(config, path));
        context.insert(
            "config",
            &ConfigData {
                title: config.title.clone(),
                description: config.description.clone(),
                language: self.blog.locale.tag().to_string(),
                root: url_for(config, ""),
            },
        );
        context.insert("labels", &self.i18n.labels());
        context
    }

    fn should_retry(&self, err: &CmsError, attempt: u32) -> bool {
        err.is_retryable() && attempt < self.blog.config.cms.retries
    }

    async fn wait_before_retry(&self, err: &CmsError, attempt: u32) {
        let delay = retry_delay(attempt);
        tracing::warn!("{} (retry {} in {:?})", err, attempt, delay);
        tokio::time::sleep(delay).await;
    }
}

/// Backoff before retry number `attempt` (1-based), capped at [`RETRY_MAX_DELAY`]
fn retry_delay(attempt: u32) -> Duration {
    2u32.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| RETRY_BASE_DELAY.checked_mul(factor))
        .map_or(RETRY_MAX_DELAY, |delay| delay.min(RETRY_MAX_DELAY))
}

fn write_file(path: &std::path::Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dir {:?}", parent))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}
