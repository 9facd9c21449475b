//! Listing aggregator - the post list behind the home page
//!
//! The list starts from a seed page and grows one CMS page at a time by
//! following the cursor each page hands out. Entries are only ever appended:
//! what is already shown keeps its position, and nothing is deduplicated.

use crate::cms::{CmsClient, CmsError, Cursor, Page, SummaryQuery};
use crate::content::{FormattedPost, PostSummary};
use crate::helpers::format_publication_date;
use crate::i18n::Locale;

/// Turns a raw summary into a display entry
pub trait SummaryFormatter {
    fn format(&self, summary: PostSummary) -> FormattedPost;
}

/// Formats publication dates with a fixed locale
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormatter {
    locale: Locale,
}

impl DateFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl SummaryFormatter for DateFormatter {
    fn format(&self, summary: PostSummary) -> FormattedPost {
        FormattedPost {
            first_publication_date: summary
                .first_publication_date
                .map(|date| format_publication_date(&date, self.locale)),
            uid: summary.uid,
            title: summary.title,
            subtitle: summary.subtitle,
            author: summary.author,
        }
    }
}

/// Outcome of the last load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Ready,
    /// The last `load_more` failed; list and cursor are as they were before it
    Failed(CmsError),
}

/// What a `load_more` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and this many posts were appended
    Appended(usize),
    /// There was no cursor; nothing was fetched
    Exhausted,
}

/// Ordered, append-only list of formatted posts plus the cursor to the next page
pub struct ListingAggregator<C, F = DateFormatter> {
    client: C,
    formatter: F,
    posts: Vec<FormattedPost>,
    next_page: Option<Cursor>,
    state: LoadState,
    pages_loaded: usize,
}

impl<C: CmsClient, F: SummaryFormatter> ListingAggregator<C, F> {
    /// Create an empty aggregator; call [`initialize`](Self::initialize) with a seed page
    pub fn new(client: C, formatter: F) -> Self {
        Self {
            client,
            formatter,
            posts: Vec::new(),
            next_page: None,
            state: LoadState::Ready,
            pages_loaded: 0,
        }
    }

    /// Query the first page and initialize from it
    pub async fn seed(client: C, formatter: F, query: &SummaryQuery) -> Result<Self, CmsError> {
        let page = client.query_post_summaries(query).await?;
        let mut aggregator = Self::new(client, formatter);
        aggregator.initialize(page);
        Ok(aggregator)
    }

    /// Replace the list with the formatted seed page and take over its cursor
    pub fn initialize(&mut self, seed: Page<PostSummary>) {
        self.posts = self.format_all(seed.results);
        self.next_page = seed.next_page;
        self.state = LoadState::Ready;
        self.pages_loaded = 1;
        tracing::debug!(
            "Listing seeded with {} posts (more: {})",
            self.posts.len(),
            self.has_more()
        );
    }

    /// Fetch the page at the cursor and append it
    ///
    /// Without a cursor this is a no-op. On failure the list and cursor are
    /// untouched, the error is kept in [`state`](Self::state) and returned, so
    /// a retryable failure can simply be retried.
    pub async fn load_more(&mut self) -> Result<LoadOutcome, CmsError> {
        let Some(cursor) = self.next_page.clone() else {
            return Ok(LoadOutcome::Exhausted);
        };

        tracing::debug!("Loading more posts from {}", cursor);
        let page = match self.client.fetch_page(&cursor).await {
            Ok(page) => page,
            Err(err) => {
                tracing::warn!("Failed to load more posts: {}", err);
                self.state = LoadState::Failed(err.clone());
                return Err(err);
            }
        };

        let formatted = self.format_all(page.results);
        let appended = formatted.len();
        self.posts.extend(formatted);
        self.next_page = page.next_page;
        self.state = LoadState::Ready;
        self.pages_loaded += 1;

        Ok(LoadOutcome::Appended(appended))
    }

    /// Keep loading until the cursor runs out; returns how many posts were appended
    pub async fn load_all(&mut self) -> Result<usize, CmsError> {
        let mut appended = 0;
        while let LoadOutcome::Appended(n) = self.load_more().await? {
            appended += n;
        }
        Ok(appended)
    }

    fn format_all(&self, results: Vec<PostSummary>) -> Vec<FormattedPost> {
        results
            .into_iter()
            .map(|summary| self.formatter.format(summary))
            .collect()
    }
}

impl<C, F> ListingAggregator<C, F> {
    /// Posts shown so far, in display order
    pub fn posts(&self) -> &[FormattedPost] {
        &self.posts
    }

    /// Whether a further page exists; drives the "load more" affordance
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn next_page(&self) -> Option<&Cursor> {
        self.next_page.as_ref()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Pages merged into the list, the seed included
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::{summary, MemoryCms};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn titles<C, F>(aggregator: &ListingAggregator<C, F>) -> Vec<&str> {
        aggregator.posts().iter().map(|p| p.title.as_str()).collect()
    }

    fn query() -> SummaryQuery {
        SummaryQuery::new(1, vec!["title".to_string()])
    }

    #[tokio::test]
    async fn test_single_page_cannot_load_more() {
        let cms = MemoryCms::chain(&[&["Only", "Two"]]);
        let mut listing = ListingAggregator::seed(&cms, DateFormatter::default(), &query())
            .await
            .unwrap();

        assert!(!listing.has_more());
        assert_eq!(titles(&listing), vec!["Only", "Two"]);
        assert_eq!(listing.load_more().await.unwrap(), LoadOutcome::Exhausted);
        assert_eq!(titles(&listing), vec!["Only", "Two"]);
        assert!(cms.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hello_world() {
        let cms = MemoryCms::chain(&[&["Hello"], &["World"]]);
        let mut listing = ListingAggregator::seed(&cms, DateFormatter::default(), &query())
            .await
            .unwrap();
        assert_eq!(listing.next_page(), Some(&Cursor::new("/page2")));

        assert_eq!(listing.load_more().await.unwrap(), LoadOutcome::Appended(1));
        assert_eq!(titles(&listing), vec!["Hello", "World"]);
        assert_eq!(listing.next_page(), None);
        assert!(!listing.has_more());
        assert_eq!(listing.load_more().await.unwrap(), LoadOutcome::Exhausted);
        assert_eq!(*cms.fetched.lock().unwrap(), vec![Cursor::new("/page2")]);
    }

    #[tokio::test]
    async fn test_chain_of_pages_concatenates_in_order() {
        let pages: &[&[&str]] = &[&["a", "b"], &["c"], &["d", "e", "f"], &["g"]];
        let cms = MemoryCms::chain(pages);
        let mut listing = ListingAggregator::seed(&cms, DateFormatter::default(), &query())
            .await
            .unwrap();

        for _ in 0..pages.len() - 1 {
            assert!(listing.has_more());
            listing.load_more().await.unwrap();
        }

        assert_eq!(titles(&listing), vec!["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(listing.next_page(), None);
        assert_eq!(listing.pages_loaded(), 4);
    }

    #[tokio::test]
    async fn test_load_all() {
        let cms = MemoryCms::chain(&[&["a"], &["b"], &["c"]]);
        let mut listing = ListingAggregator::seed(&cms, DateFormatter::default(), &query())
            .await
            .unwrap();

        assert_eq!(listing.load_all().await.unwrap(), 2);
        assert_eq!(titles(&listing), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_repeated_entries_are_kept() {
        let mut cms = MemoryCms::chain(&[&["Same"], &["Same"]]);
        cms.pages
            .get_mut(&Cursor::new("/page2"))
            .unwrap()
            .results
            .push(summary("other", "Other"));

        let mut listing = ListingAggregator::seed(&cms, DateFormatter::default(), &query())
            .await
            .unwrap();
        listing.load_all().await.unwrap();

        assert_eq!(titles(&listing), vec!["Same", "Same", "Other"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_list_and_cursor() {
        let cms = MemoryCms::chain(&[&["Hello"], &["World"]]);
        let mut listing = ListingAggregator::seed(&cms, DateFormatter::default(), &query())
            .await
            .unwrap();

        let outage = CmsError::fetch("/page2", "HTTP 503 Service Unavailable");
        cms.fail_next(outage.clone());

        let err = listing.load_more().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(listing.state(), &LoadState::Failed(outage));
        assert_eq!(titles(&listing), vec!["Hello"]);
        assert_eq!(listing.next_page(), Some(&Cursor::new("/page2")));

        // Retrying with the same cursor recovers
        listing.load_more().await.unwrap();
        assert_eq!(listing.state(), &LoadState::Ready);
        assert_eq!(titles(&listing), vec!["Hello", "World"]);
    }

    #[tokio::test]
    async fn test_dates_are_formatted_with_the_fixed_locale() {
        let cms = MemoryCms::chain(&[&["Hello"]]);
        let listing = ListingAggregator::seed(&cms, DateFormatter::new(Locale::PtBr), &query())
            .await
            .unwrap();

        let post = &listing.posts()[0];
        assert_eq!(post.first_publication_date.as_deref(), Some("15 mar 2022"));
        assert_eq!(post.uid, "hello");
        assert_eq!(post.subtitle, "About Hello");
    }

    #[tokio::test]
    async fn test_missing_date_stays_missing() {
        let mut cms = MemoryCms::chain(&[&["Undated"]]);
        if let Some(seed) = cms.seed.as_mut() {
            seed.results[0].first_publication_date = None;
        }
        let listing = ListingAggregator::seed(&cms, DateFormatter::default(), &query())
            .await
            .unwrap();
        assert_eq!(listing.posts()[0].first_publication_date, None);
    }

    struct CountingFormatter {
        inner: DateFormatter,
        calls: AtomicUsize,
    }

    impl SummaryFormatter for &CountingFormatter {
        fn format(&self, summary: PostSummary) -> FormattedPost {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.format(summary)
        }
    }

    #[tokio::test]
    async fn test_each_summary_is_formatted_exactly_once() {
        let cms = MemoryCms::chain(&[&["a", "b"], &["c"], &["d", "e"]]);
        let counter = CountingFormatter {
            inner: DateFormatter::default(),
            calls: AtomicUsize::new(0),
        };

        let mut listing = ListingAggregator::seed(&cms, &counter, &query()).await.unwrap();
        assert_eq!(counter.calls.load(Ordering::SeqCst), 2);

        listing.load_all().await.unwrap();
        assert_eq!(listing.posts().len(), 5);
        assert_eq!(counter.calls.load(Ordering::SeqCst), 5);

        // Reading the list again formats nothing
        let _ = listing.posts();
        assert!(!listing.has_more());
        assert_eq!(counter.calls.load(Ordering::SeqCst), 5);
    }
}
