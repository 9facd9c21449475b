//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
language: pt-BR

# URL
url: http://example.com
root: /

# Directory
public_dir: public

# Prismic repository
cms:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  # Prefer the PRISMIC_ACCESS_TOKEN environment variable
  access_token:
  document_type: posts
  page_size: 1
  summary_fields:
    - title
    - author
    - subtitle
  retries: 2
  timeout_secs: 10

# Post pages
reading:
  words_per_minute: 200
"#;

const GITIGNORE: &str = "public/\n.env\n";

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("languages"))?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;

    let gitignore = target_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(gitignore, GITIGNORE)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("blog");
        init_site(&target).unwrap();

        let config = SiteConfig::load(target.join("_config.yml")).unwrap();
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 1);
        assert_eq!(config.cms.access_token, None);
        assert_eq!(config.reading.words_per_minute, 200);
        assert!(config.extra.is_empty());
        assert!(target.join(".gitignore").exists());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
