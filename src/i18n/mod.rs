//! Internationalization (i18n) support
//!
//! Dates and interface strings use a fixed locale chosen in `_config.yml`,
//! never the locale of the machine running the build.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const MONTHS_PT_BR: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];
const MONTHS_ABBR_PT_BR: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];
const MONTHS_EN_US: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_ABBR_EN_US: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Supported display locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    PtBr,
    EnUs,
}

#[derive(Debug, Error)]
#[error("unsupported language `{0}` (expected pt-BR or en-US)")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Self::PtBr),
            "en-us" | "en" => Ok(Self::EnUs),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Locale {
    /// BCP 47 tag, used for `<html lang>`
    pub fn tag(&self) -> &'static str {
        match self {
            Self::PtBr => "pt-BR",
            Self::EnUs => "en-US",
        }
    }

    /// Full month name, `month` in 1..=12
    pub fn month_name(&self, month: u32) -> &'static str {
        let names = match self {
            Self::PtBr => &MONTHS_PT_BR,
            Self::EnUs => &MONTHS_EN_US,
        };
        names[(month.clamp(1, 12) - 1) as usize]
    }

    /// Abbreviated month name, `month` in 1..=12
    pub fn month_abbr(&self, month: u32) -> &'static str {
        let names = match self {
            Self::PtBr => &MONTHS_ABBR_PT_BR,
            Self::EnUs => &MONTHS_ABBR_EN_US,
        };
        names[(month.clamp(1, 12) - 1) as usize]
    }

    /// Day, abbreviated month and year in the locale's usual order
    pub fn medium_date_pattern(&self) -> &'static str {
        match self {
            Self::PtBr => "D MMM YYYY",
            Self::EnUs => "MMM D, YYYY",
        }
    }

    fn builtin(&self, key: &str) -> Option<&'static str> {
        let text = match (self, key) {
            (Self::PtBr, "load_more") => "Carregar mais posts",
            (Self::PtBr, "loading") => "Carregando...",
            (Self::PtBr, "not_found") => "Post não encontrado",
            (Self::PtBr, "minutes") => "min",
            (Self::PtBr, "home") => "Home",
            (Self::EnUs, "load_more") => "Load more posts",
            (Self::EnUs, "loading") => "Loading...",
            (Self::EnUs, "not_found") => "Post not found",
            (Self::EnUs, "minutes") => "min",
            (Self::EnUs, "home") => "Home",
            _ => return None,
        };
        Some(text)
    }
}

/// Interface strings handed to templates
#[derive(Debug, Clone, Serialize)]
pub struct Labels {
    pub load_more: String,
    pub loading: String,
    pub not_found: String,
    pub minutes: String,
    pub home: String,
}

/// Interface strings for one locale, with optional per-site overrides
pub struct I18n {
    locale: Locale,
    /// Overrides from `languages/<tag>.yml`
    overrides: HashMap<String, String>,
}

impl I18n {
    /// Create a new i18n handler
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            overrides: HashMap::new(),
        }
    }

    /// Load `<dir>/<tag>.yml` if it exists
    pub fn load_overrides<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let path = dir.as_ref().join(format!("{}.yml", self.locale.tag()));
        if !path.exists() {
            return Ok(());
        }

        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        let data: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse language file {:?}", path))?;

        for (key, value) in data {
            match value {
                serde_yaml::Value::String(s) => {
                    self.overrides.insert(key, s);
                }
                other => tracing::warn!("Ignoring non-string translation {}: {:?}", key, other),
            }
        }
        tracing::debug!("Loaded language file: {:?}", path);

        Ok(())
    }

    /// Get a translation by key, falling back to the key itself
    pub fn get(&self, key: &str) -> String {
        self.overrides
            .get(key)
            .map(String::as_str)
            .or_else(|| self.locale.builtin(key))
            .unwrap_or(key)
            .to_string()
    }

    pub fn labels(&self) -> Labels {
        Labels {
            load_more: self.get("load_more"),
            loading: self.get("loading"),
            not_found: self.get("not_found"),
            minutes: self.get("minutes"),
            home: self.get("home"),
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
