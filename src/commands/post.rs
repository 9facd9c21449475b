//! Resolve a single post on demand
//!
//! This is the fallback path for slugs that were not known at build time.
//! While the lookup runs the page holds the loading shell, which is then
//! replaced by the post or a not-found page.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::cms::CmsClient;
use crate::detail::{self, PostLookup};
use crate::generator::Generator;
use crate::Blog;

/// What happened to the slug's page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// The page already held a rendered post and was left alone
    Cached(PathBuf),
    /// The post was found and written
    Written(PathBuf),
    /// The CMS has no such post; a not-found page was written
    NotFound(PathBuf),
}

/// Resolve a slug against the configured CMS
pub async fn run(blog: &Blog, slug: &str, force: bool) -> Result<PostOutcome> {
    let client = blog.client()?;
    run_with_client(blog, &client, slug, force).await
}

pub async fn run_with_client<C: CmsClient + ?Sized>(
    blog: &Blog,
    client: &C,
    slug: &str,
    force: bool,
) -> Result<PostOutcome> {
    let generator = Generator::new(blog)?;
    let path = generator.post_output_path(slug)?;

    // A not-found page or a shell left by an interrupted run is resolved again
    let rendered = generator.has_rendered_post(slug)?;
    if rendered && !force {
        tracing::info!("Post {} is already generated", slug);
        return Ok(PostOutcome::Cached(path));
    }

    // A rendered post being refreshed stays up until its replacement is ready
    if !rendered {
        generator.write_post_lookup(slug, &PostLookup::Loading)?;
    }

    let lookup = match detail::resolve(client, slug, &generator.render_settings()).await {
        Ok(lookup) => lookup,
        Err(err) => {
            if !rendered {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!("Failed to remove loading page {:?}: {}", path, e);
                }
            }
            return Err(err).with_context(|| format!("Failed to load post {}", slug));
        }
    };

    let path = generator.write_post_lookup(slug, &lookup)?;
    Ok(match lookup {
        PostLookup::Found(_) => PostOutcome::Written(path),
        _ => PostOutcome::NotFound(path),
    })
}
