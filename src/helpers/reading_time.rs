//! Reading time estimate for post bodies

use crate::content::richtext::as_text;
use crate::content::ContentSection;

/// Reading speed assumed when the site does not configure one
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-separated words across every section body
pub fn count_words(sections: &[ContentSection]) -> usize {
    sections
        .iter()
        .map(|section| as_text(&section.body).split_whitespace().count())
        .sum()
}

/// Minutes needed to read the sections, rounded up
///
/// Empty content reads in zero minutes.
pub fn reading_time(sections: &[ContentSection], words_per_minute: usize) -> usize {
    count_words(sections).div_ceil(words_per_minute.max(1))
}
