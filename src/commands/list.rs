//! List posts from the CMS

use anyhow::{Context, Result};

use crate::cms::{CmsClient, SummaryQuery};
use crate::content::FormattedPost;
use crate::listing::{DateFormatter, ListingAggregator};
use crate::Blog;

/// Print the listing: the seed page, or every page with `all`
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let client = blog.client()?;
    let listing = load(blog, &client, all).await?;

    println!("Posts ({}):", listing.posts().len());
    for post in listing.posts() {
        println!("{}", describe(post));
    }
    if listing.has_more() {
        println!("More posts available (use --all to load every page)");
    }

    Ok(())
}

/// Seed the listing and, with `all`, follow the cursor to the end
pub async fn load<C: CmsClient>(
    blog: &Blog,
    client: C,
    all: bool,
) -> Result<ListingAggregator<C>> {
    let query = SummaryQuery::from(&blog.config.cms);
    let mut listing = ListingAggregator::seed(client, DateFormatter::new(blog.locale), &query)
        .await
        .context("Failed to query posts")?;

    if all {
        listing
            .load_all()
            .await
            .with_context(|| format!("Failed after {} pages", listing.pages_loaded()))?;
    }

    Ok(listing)
}

fn describe(post: &FormattedPost) -> String {
    let date = post.first_publication_date.as_deref().unwrap_or("-");
    if post.author.is_empty() {
        format!("  {} - {} [{}]", date, post.title, post.uid)
    } else {
        format!("  {} - {} ({}) [{}]", date, post.title, post.author, post.uid)
    }
}
