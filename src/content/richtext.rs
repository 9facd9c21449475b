//! Prismic structured text: decoding, plain text and HTML rendering

use serde::Deserialize;

/// Inline formatting applied to a character range
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSpan")]
pub struct Span {
    /// First character covered
    pub start: usize,
    /// One past the last character covered
    pub end: usize,
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink { url: String, target: Option<String> },
    Label(String),
    /// Span types without an HTML rendering
    Other(String),
}

/// Text plus the spans that style it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    pub text: String,
    pub spans: Vec<Span>,
}

impl StyledText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }
}

/// One block of a rich text field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawBlock")]
pub enum RichTextBlock {
    Heading { level: u8, text: StyledText },
    Paragraph(StyledText),
    ListItem { ordered: bool, text: StyledText },
    Preformatted(StyledText),
    Image { url: String, alt: Option<String> },
    /// Block types that carry no text and render as nothing (embeds and such)
    Unsupported { kind: String },
}

impl RichTextBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(StyledText::plain(text))
    }

    /// The block's text, if it has any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Heading { text, .. }
            | Self::Paragraph(text)
            | Self::ListItem { text, .. }
            | Self::Preformatted(text) => Some(&text.text),
            Self::Image { .. } | Self::Unsupported { .. } => None,
        }
    }
}

#[derive(Deserialize)]
struct RawSpan {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl From<RawSpan> for Span {
    fn from(raw: RawSpan) -> Self {
        let data_str = |key: &str| {
            raw.data
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let kind = match raw.kind.as_str() {
            "strong" => SpanKind::Strong,
            "em" => SpanKind::Em,
            "hyperlink" => match data_str("url") {
                Some(url) => SpanKind::Hyperlink {
                    url,
                    target: data_str("target"),
                },
                None => SpanKind::Other(raw.kind.clone()),
            },
            "label" => match data_str("label") {
                Some(label) => SpanKind::Label(label),
                None => SpanKind::Other(raw.kind.clone()),
            },
            _ => SpanKind::Other(raw.kind.clone()),
        };

        Span {
            start: raw.start,
            end: raw.end,
            kind,
        }
    }
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    spans: Vec<Span>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    alt: Option<String>,
}

impl From<RawBlock> for RichTextBlock {
    fn from(raw: RawBlock) -> Self {
        let text = StyledText {
            text: raw.text,
            spans: raw.spans,
        };

        match raw.kind.as_str() {
            "paragraph" => Self::Paragraph(text),
            "preformatted" => Self::Preformatted(text),
            "list-item" => Self::ListItem {
                ordered: false,
                text,
            },
            "o-list-item" => Self::ListItem {
                ordered: true,
                text,
            },
            "image" => match raw.url {
                Some(url) => Self::Image { url, alt: raw.alt },
                None => Self::Unsupported { kind: raw.kind },
            },
            kind => match kind
                .strip_prefix("heading")
                .and_then(|n| n.parse::<u8>().ok())
            {
                Some(level @ 1..=6) => Self::Heading { level, text },
                _ => Self::Unsupported { kind: raw.kind },
            },
        }
    }
}

/// Plain text of a rich text field, blocks joined by a single space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .filter_map(RichTextBlock::text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a rich text field to HTML
///
/// Consecutive list items are grouped into one `<ul>` or `<ol>`.
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block {
            RichTextBlock::ListItem { ordered: true, .. } => Some("ol"),
            RichTextBlock::ListItem { ordered: false, .. } => Some("ul"),
            _ => None,
        };
        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        match block {
            RichTextBlock::Heading { level, text } => {
                html.push_str(&format!("<h{0}>{1}</h{0}>", level, render_spans(text)));
            }
            RichTextBlock::Paragraph(text) => {
                html.push_str(&format!("<p>{}</p>", render_spans(text)));
            }
            RichTextBlock::ListItem { text, .. } => {
                html.push_str(&format!("<li>{}</li>", render_spans(text)));
            }
            RichTextBlock::Preformatted(text) => {
                html.push_str(&format!("<pre>{}</pre>", render_spans(text)));
            }
            RichTextBlock::Image { url, alt } => {
                html.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    escape_html(url),
                    escape_html(alt.as_deref().unwrap_or(""))
                ));
            }
            RichTextBlock::Unsupported { kind } => {
                tracing::debug!("Skipping rich text block of type {}", kind);
            }
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

/// Escape HTML special characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

/// Apply spans to text
///
/// Offsets are UTF-16 code units, the way the CMS counts them. A span edge
/// that falls inside a surrogate pair snaps to the whole character.
fn render_spans(styled: &StyledText) -> String {
    let len: usize = styled.text.chars().map(char::len_utf16).sum();

    let mut spans: Vec<&Span> = styled
        .spans
        .iter()
        .filter(|s| s.start < s.end && s.end <= len && !matches!(s.kind, SpanKind::Other(_)))
        .collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(styled.text.len());
    let mut stack: Vec<&Span> = Vec::new();
    let mut next = 0;
    let mut pos = 0;

    for c in styled.text.chars() {
        close_spans(&mut out, &mut stack, pos);
        while next < spans.len() && spans[next].start <= pos {
            out.push_str(&open_tag(spans[next]));
            stack.push(spans[next]);
            next += 1;
        }
        if c == '\n' {
            out.push_str("<br />");
        } else {
            push_escaped(&mut out, c);
        }
        pos += c.len_utf16();
    }
    close_spans(&mut out, &mut stack, len);

    out
}

/// Close every span ending at `pos`. Spans opened inside one of them are
/// closed too and reopened so the markup stays well nested.
fn close_spans<'a>(out: &mut String, stack: &mut Vec<&'a Span>, pos: usize) {
    let Some(depth) = stack.iter().position(|s| s.end <= pos) else {
        return;
    };

    let unwound: Vec<&Span> = stack.drain(depth..).collect();
    for span in unwound.iter().rev() {
        out.push_str(close_tag(span));
    }
    for span in unwound {
        if span.end > pos {
            out.push_str(&open_tag(span));
            stack.push(span);
        }
    }
}

fn open_tag(span: &Span) -> String {
    match &span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink { url, target } => match target {
            Some(target) => format!(
                r#"<a href="{}" target="{}" rel="noopener">"#,
                escape_html(url),
                escape_html(target)
            ),
            None => format!(r#"<a href="{}">"#, escape_html(url)),
        },
        SpanKind::Label(label) => format!(r#"<span class="{}">"#, escape_html(label)),
        SpanKind::Other(_) => String::new(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink { .. } => "</a>",
        SpanKind::Label(_) => "</span>",
        SpanKind::Other(_) => "",
    }
}
