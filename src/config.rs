//! Site configuration.
//!
//! Loaded from `quire.toml` (or the path given with `--config`). Stock
//! defaults are serialized to a TOML table, the user file is merged on top,
//! and the result is deserialized and validated. The file is sparse: override
//! only what you need.
//!
//! ```toml
//! [site]
//! title = "Notes"
//! url = "https://notes.example.com"
//!
//! [api]
//! base_url = "https://api.example.com/api"
//! ```
//!
//! The content API base URL may also come from the `CONTENT_API_URL`
//! environment variable, which wins over the file.
//!
//! Unknown keys are rejected to catch typos early.

use crate::gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "CONTENT_API_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("{key} is not a valid URL: {value}")]
    Url {
        key: String,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Descriptive site metadata used in page heads and feeds.
    pub site: SiteInfo,
    /// Where the content API lives.
    pub api: ApiConfig,
    /// Listing sizes.
    pub listing: ListingConfig,
    /// Category page behavior.
    pub taxonomy: TaxonomyConfig,
    pub about: AboutConfig,
    pub serve: ServeConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "listing.posts_per_page must be at least 1".into(),
            ));
        }
        if self.listing.home_max_display == 0 {
            return Err(ConfigError::Validation(
                "listing.home_max_display must be at least 1".into(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be at least 1".into(),
            ));
        }
        check_http_url("api.base_url", &self.api.base_url)?;
        check_http_url("site.url", &self.site.url)?;
        Ok(())
    }

    /// Replace `api.base_url` when an override is present and non-empty.
    pub fn with_api_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        self
    }

    /// Immutable gateway settings derived from the validated config.
    pub fn gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        let base = check_http_url("api.base_url", &self.api.base_url)?;
        Ok(GatewayConfig::new(
            base,
            Duration::from_secs(self.api.timeout_secs),
        ))
    }

    pub fn posts_per_page(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.listing.posts_per_page).unwrap_or(NonZeroUsize::MIN)
    }

    /// Site URL without a trailing slash, for building absolute links.
    pub fn site_url(&self) -> &str {
        self.site.url.trim_end_matches('/')
    }

    /// `email (Name)`, the form RSS expects for people.
    pub fn contact(&self) -> String {
        format!("{} ({})", self.site.email, self.site.author)
    }
}

fn check_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|source| ConfigError::Url {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "{key} must be an http or https URL: {value}"
        )));
    }
    Ok(url)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub author: String,
    pub email: String,
    /// Public URL of the site, used for feeds and the sitemap.
    pub url: String,
    pub language: String,
    /// Optional profile URL shown on post pages.
    pub twitter: Option<String>,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Quire".to_string(),
            description: "Notes, essays and moments".to_string(),
            author: "Anonymous".to_string(),
            email: "hello@example.com".to_string(),
            url: "https://example.com".to_string(),
            language: "en-us".to_string(),
            twitter: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the content API, e.g. `https://api.example.com/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Posts per listing page (blog, tag and category listings).
    pub posts_per_page: usize,
    /// Posts shown on the home page.
    pub home_max_display: usize,
    /// Characters of a moment's text shown before truncation.
    pub moment_excerpt: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            posts_per_page: 5,
            home_max_display: 5,
            moment_excerpt: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxonomyConfig {
    /// When set, `/categories` shows only the children of this category.
    pub categories_root: Option<String>,
    /// Category listed under `/categories/thought`.
    pub thoughts_category: String,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            categories_root: None,
            thoughts_category: "thoughts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AboutConfig {
    /// Author profile rendered on `/about`.
    pub author_slug: String,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            author_slug: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub interface: String,
    pub port: u16,
    /// Request handler threads.
    pub workers: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: "127.0.0.1".to_string(),
            port: 3000,
            workers: 4,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, captions, pagination status.
    pub text_muted: String,
    pub border: String,
    /// Links, tags, "Read more".
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111827".to_string(),
            text_muted: "#6b7280".to_string(),
            border: "#e5e7eb".to_string(),
            accent: "#db2777".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#030712".to_string(),
            text: "#f3f4f6".to_string(),
            text_muted: "#9ca3af".to_string(),
            border: "#374151".to_string(),
            accent: "#f472b6".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a TOML table; the base layer for user overrides.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as raw TOML. `Ok(None)` when the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, apply the API URL override,
/// then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
    api_url: Option<String>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    let config = config.with_api_url_override(api_url);
    config.validate()?;
    Ok(config)
}

/// Load config from `path` with the `CONTENT_API_URL` override applied.
///
/// A missing file is not an error: stock defaults apply.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), overlay, std::env::var(API_URL_ENV).ok())
}

/// A fully-commented stock `quire.toml`, printed by `quire gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Quire Configuration
# ===================
# All settings are optional. Values shown are the defaults.
# Unknown keys are an error.

# ---------------------------------------------------------------------------
# Site metadata (page titles, feeds, sitemap)
# ---------------------------------------------------------------------------
[site]
title = "Quire"
description = "Notes, essays and moments"
author = "Anonymous"
email = "hello@example.com"
# Public URL of this site. Feeds and the sitemap use absolute links.
url = "https://example.com"
language = "en-us"
# twitter = "https://x.com/you"

# ---------------------------------------------------------------------------
# Content API
# ---------------------------------------------------------------------------
[api]
# The CONTENT_API_URL environment variable overrides this value.
base_url = "http://localhost:8000/api"
timeout_secs = 10

# ---------------------------------------------------------------------------
# Listings
# ---------------------------------------------------------------------------
[listing]
posts_per_page = 5
home_max_display = 5
# Characters of a moment card shown before "…".
moment_excerpt = 100

# ---------------------------------------------------------------------------
# Categories
# ---------------------------------------------------------------------------
[taxonomy]
# Show only the children of this category on /categories.
# categories_root = "study"
# Category listed at /categories/thought.
thoughts_category = "thoughts"

# ---------------------------------------------------------------------------
# About page
# ---------------------------------------------------------------------------
[about]
author_slug = "default"

# ---------------------------------------------------------------------------
# Development server (quire serve)
# ---------------------------------------------------------------------------
[serve]
interface = "127.0.0.1"
port = 3000
workers = 4

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111827"
text_muted = "#6b7280"
border = "#e5e7eb"
accent = "#db2777"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#030712"
text = "#f3f4f6"
text_muted = "#9ca3af"
border = "#374151"
accent = "#f472b6"
"##
}

/// CSS custom properties for both color schemes.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    fn vars(scheme: &ColorScheme, indent: &str) -> String {
        [
            ("bg", &scheme.background),
            ("text", &scheme.text),
            ("text-muted", &scheme.text_muted),
            ("border", &scheme.border),
            ("accent", &scheme.accent),
        ]
        .iter()
        .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
        .collect()
    }

    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}\n",
        vars(&colors.light, "    "),
        vars(&colors.dark, "        "),
    )
}
