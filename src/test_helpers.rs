//! Shared test utilities for the quire test suite.
//!
//! Provides record builders and an in-memory [`Transport`] so gateway, page
//! and export tests can run without a content API.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let transport = MemoryTransport::new()
//!     .with_json("posts?type=blog", &[post(1, "Hello", "2024-03-01")])
//!     .with_json("categories", &[category(1, "Study", None)]);
//! let site = site_with(transport);
//! assert_eq!(site.handle("/blog").status, 200);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::gateway::{ContentGateway, GatewayError, Transport};
use crate::site::Site;
use crate::types::{Author, Category, Post, PostType, Tag};

// =========================================================================
// Record builders
// =========================================================================

/// Category whose slug is the lowercased name.
pub fn category(id: u64, name: &str, parent: Option<u64>) -> Category {
    Category {
        id,
        name: name.to_string(),
        slug: name.to_lowercase(),
        parent,
    }
}

pub fn tag(id: u64, name: &str) -> Tag {
    Tag {
        id,
        name: name.to_string(),
        slug: crate::types::tag_slug(name),
    }
}

/// Blog post created at midnight UTC on `date` (`YYYY-MM-DD`). The slug is
/// the lowercased title with spaces as dashes.
pub fn post(id: u64, title: &str, date: &str) -> Post {
    Post {
        id,
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        content: format!("# {title}\n\nBody of {title}."),
        summary: format!("Summary of {title}"),
        created_at: format!("{date}T00:00:00Z")
            .parse()
            .unwrap_or_else(|e| panic!("bad fixture date '{date}': {e}")),
        updated_at: None,
        author: None,
        category: None,
        tags: Vec::new(),
        post_type: PostType::Blog,
        image_url: None,
        image_alt: None,
        pdf_attachments: Vec::new(),
    }
}

pub fn moment(id: u64, title: &str, date: &str) -> Post {
    Post {
        post_type: PostType::Moment,
        ..post(id, title, date)
    }
}

pub fn author(slug: &str, name: &str) -> Author {
    Author {
        id: 1,
        name: name.to_string(),
        slug: slug.to_string(),
        avatar_url: None,
        occupation: None,
        company: None,
        email: None,
        twitter: None,
        linkedin: None,
        github: None,
        bio: None,
    }
}

// =========================================================================
// In-memory transport
// =========================================================================

/// Canned API responses keyed by `path` or `path?query`, e.g. `"tags"`,
/// `"posts/hello"`, `"posts?type=blog"`. Unknown keys answer 404. Every
/// request key is recorded in order.
#[derive(Default)]
pub struct MemoryTransport {
    responses: HashMap<String, String>,
    failing: bool,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every request fails with HTTP 503.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, key: &str, body: &str) -> Self {
        self.responses.insert(key.to_string(), body.to_string());
        self
    }

    pub fn with_json<S: Serialize + ?Sized>(self, key: &str, value: &S) -> Self {
        let body = serde_json::to_string(value).unwrap();
        self.with(key, &body)
    }

    /// Request keys seen so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn key(path: &[&str], query: &[(&str, &str)]) -> String {
        let mut key = path.join("/");
        if !query.is_empty() {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            key.push('?');
            key.push_str(&pairs.join("&"));
        }
        key
    }
}

impl Transport for MemoryTransport {
    fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<String, GatewayError> {
        let key = Self::key(path, query);
        self.requests.lock().unwrap().push(key.clone());
        if self.failing {
            return Err(GatewayError::Status {
                url: key,
                status: 503,
            });
        }
        self.responses
            .get(&key)
            .cloned()
            .ok_or(GatewayError::Status {
                url: key,
                status: 404,
            })
    }
}

// =========================================================================
// Site fixtures
// =========================================================================

/// Stock configuration with `https://blog.test` as the public URL.
pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.site.url = "https://blog.test".to_string();
    config.site.title = "Test Notes".to_string();
    config
}

pub fn site_with(transport: MemoryTransport) -> Site<MemoryTransport> {
    Site::new(test_config(), ContentGateway::new(transport))
}

/// Assert that `haystack` contains every needle, reporting the first miss.
pub fn assert_contains_all(haystack: &str, needles: &[&str]) {
    for needle in needles {
        assert!(
            haystack.contains(needle),
            "expected to find {needle:?} in:\n{haystack}"
        );
    }
}
