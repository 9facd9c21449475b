//! Content module - post models and rich text processing

mod post;
pub mod richtext;

pub use post::{ContentSection, FormattedPost, PostDetail, PostSummary};
pub use richtext::{RichTextBlock, Span, SpanKind, StyledText};
