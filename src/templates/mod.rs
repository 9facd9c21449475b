//! Built-in theme templates using the Tera template engine
//!
//! Templates and the stylesheet are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::content::FormattedPost;
use crate::helpers::post_path;

/// Stylesheet written to `css/style.css`
pub const STYLESHEET: &str = include_str!("theme/style.css");

/// Present in the `<head>` of a rendered post page and nowhere else
pub const RENDERED_POST_MARKER: &str = r#"<meta name="spacetraveling-post" content="rendered">"#;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    /// Site root, always ending in `/`
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    /// Path relative to the site root
    pub path: String,
}

impl From<&FormattedPost> for ListingEntry {
    fn from(post: &FormattedPost) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: post.first_publication_date.clone(),
            path: post_path(&post.uid),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    /// Pages merged into the list so far
    pub current: usize,
    /// Path of the next listing step, empty when the cursor is exhausted
    pub next_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{I18n, Locale};

    fn base_context() -> Context {
        let mut context = Context::new();
        context.insert("canonical", "https://example.com/");
        context.insert(
            "config",
            &ConfigData {
                title: "spacetraveling".to_string(),
                description: String::new(),
                language: "pt-BR".to_string(),
                root: "/".to_string(),
            },
        );
        context.insert("labels", &I18n::new(Locale::PtBr).labels());
        context
    }

    #[test]
    fn test_index_renders_load_more_only_with_next_link() {
        let renderer = TemplateRenderer::new().unwrap();
        let post = FormattedPost {
            uid: "hello".to_string(),
            first_publication_date: Some("15 mar 2022".to_string()),
            title: "Hello <World>".to_string(),
            subtitle: "sub".to_string(),
            author: "Ana".to_string(),
        };

        let mut context = base_context();
        context.insert("posts", &vec![ListingEntry::from(&post)]);
        context.insert(
            "pagination",
            &PaginationData {
                current: 1,
                next_link: "page/2/".to_string(),
            },
        );
        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"href="/post/hello/""#));
        assert!(html.contains("Hello &lt;World&gt;"));
        assert!(html.contains("15 mar 2022"));
        assert!(html.contains(r#"href="/page/2/""#));
        assert!(html.contains("Carregar mais posts"));

        context.insert(
            "pagination",
            &PaginationData {
                current: 2,
                next_link: String::new(),
            },
        );
        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("Carregar mais posts"));
    }

    #[test]
    fn test_loading_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render("loading.html", &base_context()).unwrap();
        assert!(html.contains("Carregando..."));
        assert!(html.contains(r#"http-equiv="refresh""#));
        assert!(!html.contains(RENDERED_POST_MARKER));
    }
}
