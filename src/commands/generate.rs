//! Generate static files

use anyhow::Result;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

use crate::cms::CmsClient;
use crate::generator::{BuildReport, Generator};
use crate::Blog;

/// Generate the static site from the configured CMS
pub async fn run(blog: &Blog) -> Result<BuildReport> {
    // A fresh client per build picks up the current master ref
    let client = blog.client()?;
    run_with_client(blog, &client).await
}

/// Generate the static site from any CMS client
pub async fn run_with_client<C: CmsClient>(blog: &Blog, client: &C) -> Result<BuildReport> {
    let start = Instant::now();

    let generator = Generator::new(blog)?;
    let report = generator.generate(client).await?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    if !report.failed_posts.is_empty() {
        let slugs: Vec<&str> = report
            .failed_posts
            .iter()
            .map(|(slug, _)| slug.as_str())
            .collect();
        anyhow::bail!(
            "{} post(s) could not be generated: {}",
            slugs.len(),
            slugs.join(", ")
        );
    }

    Ok(report)
}

/// Regenerate the site every `interval` until Ctrl+C
pub async fn revalidate(blog: &Blog, interval: Duration) -> Result<()> {
    tracing::info!(
        "Regenerating every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    );
    revalidate_until(interval, tokio::signal::ctrl_c(), || run(blog)).await;
    Ok(())
}

/// Run `build` every `interval` until `shutdown` completes
///
/// A failed build is logged and the next tick tries again.
async fn revalidate_until<S, F, Fut, T>(interval: Duration, shutdown: S, mut build: F)
where
    S: Future,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = build().await {
                    tracing::error!("Generation failed: {:#}", e);
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Stopping revalidation");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::{detail, MemoryCms};
    use crate::cms::{CmsError, Cursor, Page, SummaryQuery};
    use crate::content::{PostDetail, PostSummary};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_run_reports_what_was_built() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let cms = MemoryCms::chain(&[&["Hello"]]).with_post(detail("hello", "Hello", 10));

        let report = run_with_client(&blog, &cms).await.unwrap();
        assert_eq!(report.post_pages, 1);
        assert!(blog.public_dir.join("post/hello/index.html").exists());
    }

    #[tokio::test]
    async fn test_failed_post_fails_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut blog = Blog::new(dir.path()).unwrap();
        blog.config.cms.retries = 0;
        let cms = MemoryCms::chain(&[&["Hello"]]).with_post(detail("hello", "Hello", 10));

        let failing = FailingDetail(cms);
        let err = run_with_client(&blog, &failing).await.unwrap_err();
        assert!(err.to_string().contains("hello"));
        // Everything else was still written
        assert!(blog.public_dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn test_revalidation_keeps_going_after_a_failure() {
        let calls = AtomicUsize::new(0);
        let build = || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(anyhow::anyhow!("CMS unreachable"))
                } else {
                    Ok(())
                }
            }
        };

        revalidate_until(
            Duration::from_millis(10),
            tokio::time::sleep(Duration::from_millis(200)),
            build,
        )
        .await;

        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    /// Serves the listing but fails every post lookup
    struct FailingDetail(MemoryCms);

    #[async_trait::async_trait]
    impl CmsClient for FailingDetail {
        async fn query_post_summaries(
            &self,
            query: &SummaryQuery,
        ) -> Result<Page<PostSummary>, CmsError> {
            self.0.query_post_summaries(query).await
        }

        async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<PostSummary>, CmsError> {
            self.0.fetch_page(cursor).await
        }

        async fn post_by_slug(&self, _slug: &str) -> Result<PostDetail, CmsError> {
            Err(CmsError::fetch("https://cms/search", "HTTP 500"))
        }

        async fn list_all_slugs(&self) -> Result<Vec<String>, CmsError> {
            self.0.list_all_slugs().await
        }
    }
}
