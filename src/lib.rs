//! spacetraveling: a static blog generator backed by the Prismic headless CMS
//!
//! Posts live in the CMS. At build time the listing is paginated by following
//! the opaque `next_page` cursor the CMS returns, every known post is rendered
//! to its own page, and unknown slugs can be resolved on demand afterwards.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod detail;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod listing;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::i18n::Locale;

/// A blog rooted at a directory containing `_config.yml`
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Locale used for every displayed date
    pub locale: Locale,
}

impl Blog {
    /// Create a new blog from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let locale = config
            .language
            .parse::<Locale>()
            .with_context(|| format!("Invalid language in {:?}", config_path))?;
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
            locale,
        })
    }

    /// Build a CMS client from the `cms` section of the configuration
    pub fn client(&self) -> Result<cms::PrismicClient> {
        Ok(cms::PrismicClient::new(&self.config.cms)?)
    }

    /// Reading and date settings shared by the listing and detail views
    pub fn render_settings(&self) -> detail::RenderSettings {
        detail::RenderSettings {
            locale: self.locale,
            words_per_minute: self.config.reading.words_per_minute,
        }
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::BuildReport> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
