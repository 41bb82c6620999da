//! Content API access.
//!
//! [`ContentGateway`] turns "give me all tags" into an HTTP request against the
//! content API and hands back plain Rust values. It owns two concerns:
//!
//! - **Shape normalization.** Collection endpoints answer either with a bare
//!   JSON array or with a paginated envelope `{"count": .., "results": [..]}`.
//!   Both decode into [`Envelope`] and collapse to a `Vec`.
//! - **Failure policy.** A failed collection fetch is logged and reported as
//!   [`Listing::Degraded`]; a failed keyed fetch is [`Lookup::Degraded`], and
//!   an HTTP 404 on a keyed fetch is [`Lookup::NotFound`]. Callers render an
//!   empty listing or a not-found page, and can still tell "zero items" apart
//!   from "could not load".
//!
//! The wire is behind the [`Transport`] trait so pages can be rendered against
//! in-memory fixtures. [`HttpTransport`] is the real implementation, built
//! once from an immutable [`GatewayConfig`].

use crate::types::{Author, Category, Post, PostType, Tag};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response shape from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("API base URL cannot carry a path: {0}")]
    BaseUrl(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Status { status: 404, .. })
    }
}

/// Settings fixed at startup and shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    base_url: Url,
    timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        Self { base_url, timeout }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for an API path, e.g. `["posts", "hello"]` →
    /// `{base}/posts/hello/?..`. Segments are percent-encoded and the API's
    /// trailing slash convention is applied.
    pub fn endpoint(&self, path: &[&str], query: &[(&str, &str)]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path)
            .push("");
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// One GET against the content API.
///
/// `path` is the list of segments below the API base (`["tags"]`,
/// `["posts", slug]`). Returns the body of a 2xx response; non-2xx statuses
/// are [`GatewayError::Status`].
pub trait Transport: Send + Sync {
    fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<String, GatewayError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    config: GatewayConfig,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("quire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self { config, client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &[&str], query: &[(&str, &str)]) -> Result<String, GatewayError> {
        let url = self.config.endpoint(path, query)?;
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| GatewayError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| GatewayError::Http {
            url: url.to_string(),
            source,
        })
    }
}

/// The two shapes a collection endpoint may answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
    Bare(Vec<T>),
}

impl<T> Envelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Envelope::Paginated { results, .. } => results,
            Envelope::Bare(items) => items,
        }
    }
}

/// Outcome of fetching a whole collection.
#[derive(Debug)]
pub enum Listing<T> {
    Items(Vec<T>),
    /// The fetch failed; render as empty.
    Degraded(GatewayError),
}

impl<T> Listing<T> {
    /// The items, or an empty slice when degraded.
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Items(items) => items,
            Listing::Degraded(_) => &[],
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Items(items) => items,
            Listing::Degraded(_) => Vec::new(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Listing::Degraded(_))
    }
}

/// Outcome of fetching one record by key.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    /// The fetch failed for a reason other than 404.
    Degraded(GatewayError),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Degraded(_) => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Lookup::Degraded(_))
    }
}

/// Query filters understood by `/posts/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub post_type: Option<PostType>,
    pub tag_slug: Option<String>,
    /// The API includes posts from descendant categories.
    pub category_slug: Option<String>,
}

impl PostFilter {
    pub fn of_type(post_type: PostType) -> Self {
        Self {
            post_type: Some(post_type),
            ..Self::default()
        }
    }

    pub fn tag(slug: &str) -> Self {
        Self {
            tag_slug: Some(slug.to_string()),
            ..Self::default()
        }
    }

    pub fn category(slug: &str) -> Self {
        Self {
            category_slug: Some(slug.to_string()),
            ..Self::default()
        }
    }

    fn query(&self) -> Vec<(&'static str, &str)> {
        let mut query = Vec::new();
        if let Some(post_type) = self.post_type {
            query.push(("type", post_type.as_str()));
        }
        if let Some(tag) = &self.tag_slug {
            query.push(("tag_slug", tag.as_str()));
        }
        if let Some(category) = &self.category_slug {
            query.push(("category_slug", category.as_str()));
        }
        query
    }
}

pub struct ContentGateway<T> {
    transport: T,
}

impl ContentGateway<HttpTransport> {
    /// Gateway over HTTP with the given settings.
    pub fn connect(config: GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> ContentGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn posts(&self, filter: &PostFilter) -> Listing<Post> {
        self.fetch_collection(&["posts"], &filter.query())
    }

    pub fn post(&self, slug: &str) -> Lookup<Post> {
        self.fetch_one(&["posts", slug])
    }

    pub fn tags(&self) -> Listing<Tag> {
        self.fetch_collection(&["tags"], &[])
    }

    pub fn categories(&self) -> Listing<Category> {
        self.fetch_collection(&["categories"], &[])
    }

    pub fn author(&self, slug: &str) -> Lookup<Author> {
        self.fetch_one(&["authors", slug])
    }

    fn fetch_collection<R: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
    ) -> Listing<R> {
        let result = self.transport.get(path, query).and_then(|body| {
            serde_json::from_str::<Envelope<R>>(&body).map_err(|source| GatewayError::Decode {
                path: path.join("/"),
                source,
            })
        });
        match result {
            Ok(envelope) => Listing::Items(envelope.into_items()),
            Err(e) => {
                log::warn!("failed to fetch /{}/: {e}", path.join("/"));
                Listing::Degraded(e)
            }
        }
    }

    fn fetch_one<R: DeserializeOwned>(&self, path: &[&str]) -> Lookup<R> {
        let result = self.transport.get(path, &[]).and_then(|body| {
            serde_json::from_str::<R>(&body).map_err(|source| GatewayError::Decode {
                path: path.join("/"),
                source,
            })
        });
        match result {
            Ok(value) => Lookup::Found(value),
            Err(e) if e.is_not_found() => Lookup::NotFound,
            Err(e) => {
                log::warn!("failed to fetch /{}/: {e}", path.join("/"));
                Lookup::Degraded(e)
            }
        }
    }
}
