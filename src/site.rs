//! Request routing and page assembly.
//!
//! A request target (`/tags/rust/page/2?q=async`) is parsed into a [`Route`];
//! [`Site::respond`] fetches what that route needs through the
//! [`ContentGateway`], runs the pure steps (sorting, tree building,
//! pagination) and renders a [`Response`].
//!
//! Failure never escapes as an error: a degraded fetch renders an empty
//! listing with a notice, a missing record or an invalid page number
//! renders the 404 page.
//!
//! Fetches that do not depend on each other (a post and its neighbours, a
//! tag list and the tag's posts) run in parallel with `rayon::join`.

use crate::config::SiteConfig;
use crate::feed;
use crate::gateway::{ContentGateway, Listing, Lookup, PostFilter, Transport};
use crate::pagination::paginate_raw;
use crate::render::{self, CategoryView, Layout, ListingBody, ListingPage, Section};
use crate::sitemap;
use crate::taxonomy::{self, CategoryNode, TaxonomyError};
use crate::types::{Category, Post, PostType, Tag, sort_newest_first, tag_slug};
use chrono::Utc;
use maud::Markup;
use percent_encoding::percent_decode_str;

pub const HTML: &str = "text/html; charset=utf-8";
pub const RSS: &str = "application/rss+xml; charset=utf-8";
pub const XML: &str = "application/xml; charset=utf-8";

/// Page number and search term of a listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Raw page number; `None` is page 1.
    pub page: Option<String>,
    pub search: Option<String>,
}

impl ListingQuery {
    pub fn page(n: usize) -> Self {
        Self {
            page: (n > 1).then(|| n.to_string()),
            search: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Blog(ListingQuery),
    Post(String),
    Tags,
    Tag { slug: String, query: ListingQuery },
    TagFeed(String),
    Categories,
    Category { slug: String, query: ListingQuery },
    Thoughts(ListingQuery),
    Moments,
    About,
    Feed,
    Sitemap,
    NotFound,
}

impl Route {
    /// Parse a request target (path plus optional query string).
    pub fn parse(target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        let mut listing = ListingQuery::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "page" => listing.page = Some(value.into_owned()),
                "q" => listing.search = Some(value.into_owned()),
                _ => {}
            }
        }
        let paged = |listing: ListingQuery, n: &str| ListingQuery {
            page: Some(n.to_string()),
            ..listing
        };

        match segments.as_slice() {
            [] => Route::Home,
            ["blog"] => Route::Blog(listing),
            ["blog", "page", n] => Route::Blog(paged(listing, *n)),
            ["blog", slug] => Route::Post(slug.to_string()),
            ["tags"] => Route::Tags,
            ["tags", slug] => Route::Tag {
                slug: slug.to_string(),
                query: listing,
            },
            ["tags", slug, "page", n] => Route::Tag {
                slug: slug.to_string(),
                query: paged(listing, *n),
            },
            ["tags", slug, "feed.xml"] => Route::TagFeed(slug.to_string()),
            ["categories"] => Route::Categories,
            ["categories", "moment"] | ["moments"] => Route::Moments,
            ["categories", "thought"] => Route::Thoughts(listing),
            ["categories", "thought", "page", n] => Route::Thoughts(paged(listing, *n)),
            ["categories", slug] => Route::Category {
                slug: slug.to_string(),
                query: listing,
            },
            ["categories", slug, "page", n] => Route::Category {
                slug: slug.to_string(),
                query: paged(listing, *n),
            },
            ["about"] => Route::About,
            ["feed.xml"] => Route::Feed,
            ["sitemap.xml"] => Route::Sitemap,
            _ => Route::NotFound,
        }
    }

    /// Canonical path of this route, ignoring any search term.
    pub fn path(&self) -> String {
        fn paged(base: String, query: &ListingQuery) -> String {
            match query.page.as_deref() {
                Some(n) if n != "1" => format!("{base}/page/{n}"),
                _ => base,
            }
        }
        match self {
            Route::Home => "/".into(),
            Route::Blog(q) => paged("/blog".into(), q),
            Route::Post(slug) => format!("/blog/{slug}"),
            Route::Tags => "/tags".into(),
            Route::Tag { slug, query } => paged(format!("/tags/{slug}"), query),
            Route::TagFeed(slug) => format!("/tags/{slug}/feed.xml"),
            Route::Categories => "/categories".into(),
            Route::Category { slug, query } => paged(format!("/categories/{slug}"), query),
            Route::Thoughts(q) => paged("/categories/thought".into(), q),
            Route::Moments => "/categories/moment".into(),
            Route::About => "/about".into(),
            Route::Feed => "/feed.xml".into(),
            Route::Sitemap => "/sitemap.xml".into(),
            Route::NotFound => "/404".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn html(status: u16, markup: Markup) -> Self {
        Self {
            status,
            content_type: HTML,
            body: markup.into_string(),
        }
    }

    fn document(content_type: &'static str, body: String) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }
}

/// Everything the content API currently serves, for `quire check`.
#[derive(Debug)]
pub struct Inventory {
    pub posts: Listing<Post>,
    pub tags: Listing<Tag>,
    pub categories: Listing<Category>,
}

impl Inventory {
    pub fn category_tree(&self) -> Result<Vec<CategoryNode>, TaxonomyError> {
        taxonomy::build_tree(self.categories.items())
    }

    pub fn count_of(&self, post_type: PostType) -> usize {
        self.posts
            .items()
            .iter()
            .filter(|p| p.post_type == post_type)
            .count()
    }

    /// Names of the collections that could not be fetched.
    pub fn degraded(&self) -> Vec<&'static str> {
        [
            ("posts", self.posts.is_degraded()),
            ("tags", self.tags.is_degraded()),
            ("categories", self.categories.is_degraded()),
        ]
        .into_iter()
        .filter_map(|(name, degraded)| degraded.then_some(name))
        .collect()
    }
}

pub struct Site<T> {
    config: SiteConfig,
    layout: Layout,
    gateway: ContentGateway<T>,
}

impl<T: Transport> Site<T> {
    pub fn new(config: SiteConfig, gateway: ContentGateway<T>) -> Self {
        let layout = Layout::new(&config);
        Self {
            config,
            layout,
            gateway,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Parse and answer one request target.
    pub fn handle(&self, target: &str) -> Response {
        self.respond(&Route::parse(target))
    }

    pub fn respond(&self, route: &Route) -> Response {
        match route {
            Route::Home => self.home(),
            Route::Blog(query) => {
                let posts = self.blog_posts();
                self.listing("All Posts", "/blog", Section::Blog, &posts, query)
            }
            Route::Post(slug) => self.post(slug),
            Route::Tags => Response::html(200, render::render_tags(&self.layout, &self.gateway.tags())),
            Route::Tag { slug, query } => self.tag(slug, query),
            Route::TagFeed(slug) => self.tag_feed(slug),
            Route::Categories => self.categories(),
            Route::Category { slug, query } => self.category(slug, query),
            Route::Thoughts(query) => {
                let posts = sorted(
                    self.gateway
                        .posts(&PostFilter::category(&self.config.taxonomy.thoughts_category)),
                );
                self.listing("Thoughts", "/categories/thought", Section::Categories, &posts, query)
            }
            Route::Moments => {
                let moments = sorted(self.gateway.posts(&PostFilter::of_type(PostType::Moment)));
                let markup =
                    render::render_moments(&self.layout, &moments, self.config.listing.moment_excerpt);
                Response::html(200, markup)
            }
            Route::About => {
                let author = self.gateway.author(&self.config.about.author_slug).found();
                Response::html(200, render::render_about(&self.layout, author.as_ref()))
            }
            Route::Feed => {
                let posts = self.blog_posts();
                self.feed(posts.items(), None)
            }
            Route::Sitemap => self.sitemap(),
            Route::NotFound => self.not_found(),
        }
    }

    /// Fetch posts, tags and categories in parallel.
    pub fn inventory(&self) -> Inventory {
        let (posts, (tags, categories)) = rayon::join(
            || sorted(self.gateway.posts(&PostFilter::default())),
            || rayon::join(|| self.gateway.tags(), || self.gateway.categories()),
        );
        Inventory {
            posts,
            tags,
            categories,
        }
    }

    pub fn not_found(&self) -> Response {
        Response::html(404, render::render_not_found(&self.layout))
    }

    fn blog_posts(&self) -> Listing<Post> {
        sorted(self.gateway.posts(&PostFilter::of_type(PostType::Blog)))
    }

    fn home(&self) -> Response {
        let posts = self.blog_posts();
        let markup = render::render_home(&self.layout, &posts, self.config.listing.home_max_display);
        Response::html(200, markup)
    }

    fn listing(
        &self,
        title: &str,
        base_path: &str,
        section: Section,
        posts: &Listing<Post>,
        query: &ListingQuery,
    ) -> Response {
        let items = posts.items();
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let results: Vec<Post>;
        let body = match search {
            Some(q) => {
                results = items
                    .iter()
                    .filter(|p| matches_search(p, q))
                    .cloned()
                    .collect();
                ListingBody::Search {
                    query: q,
                    results: &results,
                }
            }
            None => {
                let raw = query.page.as_deref().unwrap_or("1");
                let page = paginate_raw(items, self.config.posts_per_page(), raw);
                if !page.valid {
                    return self.not_found();
                }
                ListingBody::Page(page)
            }
        };

        let page = ListingPage {
            title,
            base_path,
            section,
            body,
            degraded: posts.is_degraded(),
        };
        Response::html(200, render::render_listing(&self.layout, &page))
    }

    fn post(&self, slug: &str) -> Response {
        let (lookup, all) = rayon::join(|| self.gateway.post(slug), || self.blog_posts());
        let post = match lookup {
            Lookup::Found(post) => post,
            Lookup::NotFound | Lookup::Degraded(_) => return self.not_found(),
        };

        let items = all.items();
        let (previous, next) = match items.iter().position(|p| p.slug == post.slug) {
            Some(i) => (items.get(i + 1), i.checked_sub(1).and_then(|j| items.get(j))),
            None => (None, None),
        };
        Response::html(200, render::render_post(&self.layout, &post, previous, next))
    }

    fn tag(&self, slug: &str, query: &ListingQuery) -> Response {
        let (tags, posts) = rayon::join(
            || self.gateway.tags(),
            || sorted(self.gateway.posts(&PostFilter::tag(slug))),
        );
        let (title, posts) = match &tags {
            Listing::Items(tags) => match find_tag(tags, slug) {
                // Linked by a name-derived slug the API spells differently.
                Some(tag) if tag.slug != slug => (
                    tag.name.clone(),
                    sorted(self.gateway.posts(&PostFilter::tag(&tag.slug))),
                ),
                Some(tag) => (tag.name.clone(), posts),
                None => return self.not_found(),
            },
            Listing::Degraded(_) => (title_from_slug(slug), posts),
        };
        let base_path = format!("/tags/{slug}");
        self.listing(&title, &base_path, Section::Tags, &posts, query)
    }

    fn tag_feed(&self, slug: &str) -> Response {
        let (tags, posts) = rayon::join(
            || self.gateway.tags(),
            || sorted(self.gateway.posts(&PostFilter::default())),
        );
        let (name, tagged): (String, Vec<Post>) = match &tags {
            Listing::Items(tags) => {
                let Some(tag) = find_tag(tags, slug) else {
                    return self.not_found();
                };
                let tagged = posts
                    .items()
                    .iter()
                    .filter(|p| p.has_tag(&tag.name))
                    .cloned()
                    .collect();
                (tag.name.clone(), tagged)
            }
            // Without the tag list, match post tag names by their slug form.
            Listing::Degraded(_) => {
                let tagged: Vec<Post> = posts
                    .items()
                    .iter()
                    .filter(|p| p.tags.iter().any(|t| tag_slug(t) == slug))
                    .cloned()
                    .collect();
                let name = tagged
                    .iter()
                    .flat_map(|p| &p.tags)
                    .find(|t| tag_slug(t) == slug)
                    .cloned()
                    .unwrap_or_else(|| title_from_slug(slug));
                (name, tagged)
            }
        };
        self.feed(&tagged, Some(&name))
    }

    fn feed(&self, posts: &[Post], tag: Option<&str>) -> Response {
        match feed::build_feed(&self.config, posts, tag) {
            Ok(xml) => Response::document(RSS, xml),
            Err(e) => {
                log::error!("failed to build feed: {e}");
                Response::html(503, render::render_unavailable(&self.layout, "feed"))
            }
        }
    }

    fn categories(&self) -> Response {
        let categories = self.gateway.categories();
        let forest = taxonomy::build_tree(categories.items());
        let reason;
        let view = match &forest {
            Err(e) => {
                log::warn!("category tree rejected: {e}");
                reason = e.to_string();
                CategoryView::Invalid(&reason)
            }
            Ok(forest) => match self.config.taxonomy.categories_root.as_deref() {
                None => CategoryView::Forest(forest),
                Some(root) => match taxonomy::find_by_slug(forest, root) {
                    Some(node) if !node.is_leaf() => CategoryView::Forest(&node.children),
                    _ => CategoryView::EmptyRoot(root),
                },
            },
        };
        let markup = render::render_categories(&self.layout, view, categories.is_degraded());
        Response::html(200, markup)
    }

    fn category(&self, slug: &str, query: &ListingQuery) -> Response {
        let (categories, posts) = rayon::join(
            || self.gateway.categories(),
            || sorted(self.gateway.posts(&PostFilter::category(slug))),
        );
        let title = match &categories {
            Listing::Items(categories) => match categories.iter().find(|c| c.slug == slug) {
                Some(category) => category.name.clone(),
                None => return self.not_found(),
            },
            Listing::Degraded(_) => title_from_slug(slug),
        };
        let base_path = format!("/categories/{slug}");
        self.listing(&title, &base_path, Section::Categories, &posts, query)
    }

    fn sitemap(&self) -> Response {
        let inventory = self.inventory();
        let xml = sitemap::build_sitemap(
            self.config.site_url(),
            Utc::now().date_naive(),
            inventory.posts.items(),
            inventory.tags.items(),
            inventory.categories.items(),
        );
        Response::document(XML, xml)
    }
}

fn sorted(mut listing: Listing<Post>) -> Listing<Post> {
    if let Listing::Items(posts) = &mut listing {
        sort_newest_first(posts);
    }
    listing
}

/// The tag a URL slug names: the API's slug, else a name whose slug form
/// matches.
fn find_tag<'a>(tags: &'a [Tag], slug: &str) -> Option<&'a Tag> {
    tags.iter()
        .find(|t| t.slug == slug)
        .or_else(|| tags.iter().find(|t| tag_slug(&t.name) == slug))
}

/// Case-insensitive substring match over title, summary and tags.
pub fn matches_search(post: &Post, query: &str) -> bool {
    let needle = query.to_lowercase();
    let haystack = format!("{} {} {}", post.title, post.summary, post.tags.join(" ")).to_lowercase();
    haystack.contains(&needle)
}

/// `"web-dev"` → `"Web-dev"`.
fn title_from_slug(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
