//! Records returned by the content API.
//!
//! These mirror the JSON the API serializes. They are plain data: the only
//! behavior here is small accessors used by more than one page renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flat category record. `parent` points at another category's `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

/// Author profile served by `/authors/{slug}/` and nested inside posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    /// Markdown (raw HTML allowed).
    #[serde(default)]
    pub bio: Option<String>,
}

/// A post's author is either expanded inline or referenced by id,
/// depending on how the API serializer is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    Profile(Author),
    Id(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    #[default]
    Blog,
    Moment,
}

impl PostType {
    /// Value of the `type` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Blog => "blog",
            PostType::Moment => "moment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfAttachment {
    pub id: u64,
    /// Absolute URL of the uploaded file.
    pub file: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl PdfAttachment {
    /// Link label: the description, or the file name from the URL.
    pub fn label(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => self.file.rsplit('/').next().unwrap_or(&self.file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub slug: String,
    /// Markdown body.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
    #[serde(default)]
    pub category: Option<u64>,
    /// Tag names (not slugs).
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub post_type: PostType,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    #[serde(default)]
    pub pdf_attachments: Vec<PdfAttachment>,
}

impl Post {
    /// The nested author profile, when the API expanded it.
    pub fn author_profile(&self) -> Option<&Author> {
        match &self.author {
            Some(AuthorRef::Profile(author)) => Some(author),
            _ => None,
        }
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }
}

/// Newest first, ties broken by id so ordering is stable across fetches.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// URL slug for a tag name as displayed on a post.
///
/// Posts carry tag *names*; links need the slug form. Follows the backend's
/// unicode slugify: lowercase, drop everything but word characters,
/// whitespace and `-`, collapse runs of whitespace and dashes into one `-`,
/// then trim `-` and `_` from both ends.
pub fn tag_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        }
    }
    if pending_dash {
        slug.push('-');
    }
    slug.trim_matches(['-', '_']).to_string()
}
