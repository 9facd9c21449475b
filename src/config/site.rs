//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Environment variable that overrides `cms.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,

    // Post pages
    #[serde(default)]
    pub reading: ReadingConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),

            cms: CmsConfig::default(),
            reading: ReadingConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Let the environment supply the CMS access token
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.trim().is_empty() {
                tracing::debug!("Using CMS access token from {}", ACCESS_TOKEN_ENV);
                self.cms.access_token = Some(token);
            }
        }
    }
}

/// Prismic repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API entry point, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
    /// Posts per listing page
    pub page_size: usize,
    /// Fields fetched for listing summaries
    pub summary_fields: Vec<String>,
    /// Extra attempts for a failed listing fetch that is worth retrying
    pub retries: u32,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 1,
            summary_fields: vec![
                "title".to_string(),
                "author".to_string(),
                "subtitle".to_string(),
            ],
            retries: 2,
            timeout_secs: 10,
        }
    }
}

/// Reading time estimate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: crate::helpers::DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 1);
        assert_eq!(config.reading.words_per_minute, 200);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en-US
cms:
  endpoint: https://my-repo.cdn.prismic.io/api/v2
  page_size: 5
reading:
  words_per_minute: 250
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.language, "en-US");
        assert_eq!(config.cms.endpoint, "https://my-repo.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.page_size, 5);
        // Unset nested fields keep their defaults
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.summary_fields.len(), 3);
        assert_eq!(config.reading.words_per_minute, 250);
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let yaml = "title: Blog\ngithub_username: someone\n";
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.extra.get("github_username").and_then(|v| v.as_str()),
            Some("someone")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "title: From Disk\npublic_dir: out\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.title, "From Disk");
        assert_eq!(config.public_dir, "out");
    }

    #[test]
    fn test_access_token_from_env() {
        let mut config = SiteConfig::default();
        config.cms.access_token = Some("from-file".to_string());

        std::env::set_var(ACCESS_TOKEN_ENV, "   ");
        config.apply_env();
        assert_eq!(config.cms.access_token.as_deref(), Some("from-file"));

        std::env::set_var(ACCESS_TOKEN_ENV, "from-env");
        config.apply_env();
        assert_eq!(config.cms.access_token.as_deref(), Some("from-env"));

        std::env::remove_var(ACCESS_TOKEN_ENV);
    }
}
