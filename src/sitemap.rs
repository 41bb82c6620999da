//! Sitemap generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/blog/hello</loc>
//!     <lastmod>2024-03-01</lastmod>
//!   </url>
//! </urlset>
//! ```
//!
//! Static sections come first and carry the generation date; posts carry
//! their creation date; tags and categories have no `lastmod`.

use crate::types::{Category, Post, Tag};
use chrono::NaiveDate;
use std::borrow::Cow;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const STATIC_ROUTES: &[&str] = &["", "blog", "tags", "about", "categories"];

struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
}

/// Build the sitemap for `site_url` (no trailing slash).
pub fn build_sitemap(
    site_url: &str,
    today: NaiveDate,
    posts: &[Post],
    tags: &[Tag],
    categories: &[Category],
) -> String {
    let today = today.format("%Y-%m-%d").to_string();

    let statics = STATIC_ROUTES.iter().map(|route| UrlEntry {
        loc: format!("{site_url}/{route}"),
        lastmod: Some(today.clone()),
    });
    let posts = posts.iter().map(|post| UrlEntry {
        loc: format!("{site_url}/blog/{}", post.slug),
        lastmod: Some(post.created_at.format("%Y-%m-%d").to_string()),
    });
    let tags = tags.iter().map(|tag| UrlEntry {
        loc: format!("{site_url}/tags/{}", tag.slug),
        lastmod: None,
    });
    let categories = categories.iter().map(|category| UrlEntry {
        loc: format!("{site_url}/categories/{}", category.slug),
        lastmod: None,
    });

    into_xml(statics.chain(posts).chain(tags).chain(categories))
}

fn into_xml(entries: impl Iterator<Item = UrlEntry>) -> String {
    let mut xml = String::with_capacity(4096);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(&entry.loc));
        xml.push_str("</loc>\n");
        if let Some(lastmod) = entry.lastmod {
            xml.push_str("    <lastmod>");
            xml.push_str(&lastmod);
            xml.push_str("</lastmod>\n");
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
