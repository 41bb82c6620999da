//! HTML page rendering.
//!
//! Every page is a pure function from already-fetched data to [`Markup`].
//! Fetching, pagination and status codes are decided by [`crate::site`];
//! this module only lays things out.
//!
//! ## Pages
//!
//! - **Home**: newest posts with summaries and an "All Posts" link
//! - **Listings**: blog, tag and category listings with page navigation and
//!   a search box
//! - **Post**: markdown body, author, tags, PDF attachments, older/newer links
//! - **Tags / Categories**: tag cloud and category tree
//! - **Moments**: card grid of short image posts
//! - **About**: author profile with markdown bio
//! - **Not found**
//!
//! ## Styling
//!
//! `static/style.css` is embedded at compile time and inlined together with
//! the color custom properties generated from the config, so every page is a
//! single self-contained document.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Markdown is converted with pulldown-cmark; raw HTML in post bodies and
//! author bios passes through unchanged.

use crate::config::{self, SiteConfig};
use crate::gateway::Listing;
use crate::pagination::Paginated;
use crate::taxonomy::{self, CategoryNode};
use crate::types::{Author, Post, Tag, tag_slug};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::borrow::Cow;

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Square grey tile shown when a moment has no image.
const MOMENT_PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 1 1'%3E%3Crect width='1' height='1' fill='%23d1d5db'/%3E%3C/svg%3E";

const DEGRADED_NOTICE: &str = "Some content could not be loaded right now.";

/// Site-wide pieces shared by every page: title, language and inline CSS.
#[derive(Debug, Clone)]
pub struct Layout {
    site_title: String,
    language: String,
    twitter: Option<String>,
    css: String,
}

impl Layout {
    pub fn new(config: &SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            site_title: config.site.title.clone(),
            language: config.site.language.clone(),
            twitter: config.site.twitter.clone(),
            css: format!("{color_css}\n{CSS_STATIC}"),
        }
    }

    pub fn site_title(&self) -> &str {
        &self.site_title
    }
}

/// Top-level sections, used to highlight the current nav entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Blog,
    Tags,
    Categories,
    Moments,
    About,
}

const NAV: &[(Section, &str, &str)] = &[
    (Section::Blog, "/blog", "Blog"),
    (Section::Tags, "/tags", "Tags"),
    (Section::Categories, "/categories", "Categories"),
    (Section::Moments, "/categories/moment", "Moments"),
    (Section::About, "/about", "About"),
];

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(layout: &Layout, title: &str, section: Section, content: Markup) -> Markup {
    let full_title = if title.is_empty() || title == layout.site_title {
        layout.site_title.clone()
    } else {
        format!("{title} | {}", layout.site_title)
    };
    html! {
        (DOCTYPE)
        html lang=(layout.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                link rel="alternate" type="application/rss+xml" title=(layout.site_title) href="/feed.xml";
                style { (PreEscaped(&layout.css)) }
            }
            body {
                (site_header(layout, section))
                main { (content) }
            }
        }
    }
}

fn site_header(layout: &Layout, section: Section) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (layout.site_title) }
            nav.site-nav {
                ul {
                    @for (item, href, label) in NAV {
                        li class=[(*item == section).then_some("current")] {
                            a href=(href) { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn degraded_notice(degraded: bool) -> Markup {
    html! {
        @if degraded {
            p.notice { (DEGRADED_NOTICE) }
        }
    }
}

fn tag_links(tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tag-list {
                @for name in tags {
                    li { a href={ "/tags/" (tag_slug(name)) } { (name) } }
                }
            }
        }
    }
}

fn post_summary(post: &Post) -> Markup {
    html! {
        article {
            time datetime=(post.created_at.to_rfc3339()) { (format_date(&post.created_at)) }
            h2 { a href={ "/blog/" (post.slug) } { (post.title) } }
            (tag_links(&post.tags))
            @if !post.summary.is_empty() {
                p.muted { (post.summary) }
            }
        }
    }
}

/// Href of page `n` of a listing rooted at `base_path`. Page 1 is the base
/// path itself.
pub fn page_href(base_path: &str, page: i64) -> String {
    if page <= 1 {
        base_path.to_string()
    } else {
        format!("{base_path}/page/{page}")
    }
}

/// Previous / "x of y" / Next. Nothing when there is a single page.
pub fn pagination_nav(base_path: &str, current: i64, total: usize) -> Markup {
    let has_previous = current > 1;
    let has_next = current >= 1 && (current as u64) < total as u64;
    html! {
        @if total > 1 {
            nav.pagination aria-label="Pagination" {
                @if has_previous {
                    a rel="prev" href=(page_href(base_path, current - 1)) { "Previous" }
                } @else {
                    span.disabled { "Previous" }
                }
                span { (current) " of " (total) }
                @if has_next {
                    a rel="next" href=(page_href(base_path, current + 1)) { "Next" }
                } @else {
                    span.disabled { "Next" }
                }
            }
        }
    }
}

fn search_box(base_path: &str, query: Option<&str>) -> Markup {
    html! {
        form.search action=(base_path) method="get" role="search" {
            input type="search" name="q" value=[query] placeholder="Search articles" aria-label="Search articles";
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Home page: the first `max_display` of `posts`, which must already be
/// ordered newest first.
pub fn render_home(layout: &Layout, posts: &Listing<Post>, max_display: usize) -> Markup {
    let items = posts.items();
    let content = html! {
        h1.page-title { "Latest" }
        (degraded_notice(posts.is_degraded()))
        ul.post-list {
            @if items.is_empty() {
                li { "No posts found." }
            }
            @for post in items.iter().take(max_display) {
                li {
                    (post_summary(post))
                    a href={ "/blog/" (post.slug) } aria-label={ "Read more: \"" (post.title) "\"" } {
                        "Read more →"
                    }
                }
            }
        }
        @if items.len() > max_display {
            p.more { a href="/blog" aria-label="All posts" { "All Posts →" } }
        }
    };
    base_document(layout, "", Section::Home, content)
}

/// What a listing page shows below its title.
#[derive(Debug, Clone, Copy)]
pub enum ListingBody<'a> {
    /// One page of the listing.
    Page(Paginated<'a, Post>),
    /// All posts matching a `?q=` search, unpaginated.
    Search { query: &'a str, results: &'a [Post] },
}

#[derive(Debug, Clone, Copy)]
pub struct ListingPage<'a> {
    pub title: &'a str,
    pub base_path: &'a str,
    pub section: Section,
    pub body: ListingBody<'a>,
    pub degraded: bool,
}

pub fn render_listing(layout: &Layout, page: &ListingPage<'_>) -> Markup {
    let (posts, query) = match page.body {
        ListingBody::Page(p) => (p.slice, None),
        ListingBody::Search { query, results } => (results, Some(query)),
    };
    let content = html! {
        h1.page-title { (page.title) }
        (search_box(page.base_path, query))
        (degraded_notice(page.degraded))
        ul.post-list {
            @if posts.is_empty() {
                li {
                    @if query.is_some() { "No posts found matching your search." } @else { "No posts found." }
                }
            }
            @for post in posts {
                li { (post_summary(post)) }
            }
        }
        @if let ListingBody::Page(p) = page.body {
            (pagination_nav(page.base_path, p.current_page, p.total_pages))
        }
    };
    base_document(layout, page.title, page.section, content)
}

/// Single post with links to its older (`previous`) and newer (`next`)
/// neighbours.
pub fn render_post(
    layout: &Layout,
    post: &Post,
    previous: Option<&Post>,
    next: Option<&Post>,
) -> Markup {
    let twitter_handle = layout.twitter.as_deref().map(twitter_handle);
    let content = html! {
        article {
            header.post-header {
                time datetime=(post.created_at.to_rfc3339()) { (format_date_long(&post.created_at)) }
                h1.page-title { (post.title) }
                @if let Some(author) = post.author_profile() {
                    div.author {
                        @if let Some(avatar) = &author.avatar_url {
                            img src=(avatar) alt="avatar" width="38" height="38";
                        }
                        div {
                            div { (author.name) }
                            @if let (Some(handle), Some(url)) = (&twitter_handle, &layout.twitter) {
                                a href=(url) { (handle) }
                            }
                        }
                    }
                }
                (tag_links(&post.tags))
            }
            div.post-body { (PreEscaped(markdown_to_html(&post.content))) }
            @if !post.pdf_attachments.is_empty() {
                section.attachments {
                    h2 { "Attachments" }
                    ul {
                        @for attachment in &post.pdf_attachments {
                            li { a href=(attachment.file) target="_blank" rel="noopener" { (attachment.label()) } }
                        }
                    }
                }
            }
            @if previous.is_some() || next.is_some() {
                nav.post-nav {
                    div {
                        @if let Some(prev) = previous {
                            div.muted { "Previous Article" }
                            a href={ "/blog/" (prev.slug) } { (prev.title) }
                        }
                    }
                    div {
                        @if let Some(next) = next {
                            div.muted { "Next Article" }
                            a href={ "/blog/" (next.slug) } { (next.title) }
                        }
                    }
                }
            }
            p { a href="/blog" { "← Back to the blog" } }
        }
    };
    base_document(layout, &post.title, Section::Blog, content)
}

/// Tag index, sorted by name.
pub fn render_tags(layout: &Layout, tags: &Listing<Tag>) -> Markup {
    let mut sorted: Vec<&Tag> = tags.items().iter().collect();
    sorted.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    let content = html! {
        h1.page-title { "Tags" }
        (degraded_notice(tags.is_degraded()))
        @if sorted.is_empty() {
            p { "No tags found." }
        }
        ul.tag-list {
            @for tag in sorted {
                li { a href={ "/tags/" (tag.slug) } aria-label={ "View posts tagged " (tag.name) } { (tag.name) } }
            }
        }
    };
    base_document(layout, "Tags", Section::Tags, content)
}

/// What the category index shows.
#[derive(Debug, Clone, Copy)]
pub enum CategoryView<'a> {
    /// Nodes to render at depth 0.
    Forest(&'a [CategoryNode]),
    /// The configured root slug does not exist or has no children.
    EmptyRoot(&'a str),
    /// The category data could not be turned into a tree.
    Invalid(&'a str),
}

pub fn render_categories(layout: &Layout, view: CategoryView<'_>, degraded: bool) -> Markup {
    let content = html! {
        h1.page-title { "Categories" }
        (degraded_notice(degraded))
        @match view {
            CategoryView::Forest(nodes) => {
                @if nodes.is_empty() {
                    p { "No categories found." }
                } @else {
                    ul.category-tree { (render_category_tree(nodes)) }
                }
            }
            CategoryView::EmptyRoot(slug) => {
                p { "No sub-categories found under '" (slug) "'." }
            }
            CategoryView::Invalid(reason) => {
                p.notice { "Categories are unavailable: " (reason) }
            }
        }
    };
    base_document(layout, "Categories", Section::Categories, content)
}

/// Nested `li`/`ul` items for a category forest, roots at depth 0.
///
/// Each node becomes `li data-depth=N` holding its link, followed by a
/// nested `ul` of its children when it has any. Built from a flat
/// depth-first walk so deep trees do not deepen the call stack: a node at
/// depth `d` first closes every list opened below depth `d`.
pub fn render_category_tree(forest: &[CategoryNode]) -> Markup {
    let mut out = String::new();
    let mut open = 0usize;
    taxonomy::walk(forest, |node, depth| {
        while open > depth {
            out.push_str("</ul></li>");
            open -= 1;
        }
        out.push_str(&format!("<li data-depth=\"{depth}\">"));
        out.push_str(&html! { a href={ "/categories/" (node.slug) } { (node.name) } }.into_string());
        if node.is_leaf() {
            out.push_str("</li>");
        } else {
            out.push_str("<ul>");
            open += 1;
        }
    });
    for _ in 0..open {
        out.push_str("</ul></li>");
    }
    PreEscaped(out)
}

pub fn render_moments(layout: &Layout, moments: &Listing<Post>, excerpt: usize) -> Markup {
    let items = moments.items();
    let content = html! {
        h1.page-title { "Moments" }
        p.muted { "Snapshots from life, travel, and thought." }
        (degraded_notice(moments.is_degraded()))
        @if items.is_empty() {
            p { "No moments found yet. Stay tuned!" }
        } @else {
            div.moment-grid {
                @for moment in items {
                    (moment_card(moment, excerpt))
                }
            }
        }
    };
    base_document(layout, "Moments", Section::Moments, content)
}

fn moment_card(moment: &Post, excerpt: usize) -> Markup {
    let image = moment.image_url.as_deref().unwrap_or(MOMENT_PLACEHOLDER);
    html! {
        article.moment-card {
            time datetime=(moment.created_at.to_rfc3339()) {
                span { (moment.created_at.format("%b %-d").to_string()) }
                span { (moment.created_at.format("%Y").to_string()) }
            }
            img src=(image) alt=(moment_alt(moment)) loading="lazy";
            div.moment-text {
                h3 { (moment.title) }
                p { (truncate_chars(&moment.content, excerpt)) }
            }
        }
    }
}

/// Alt text: `image_alt`, then the title, then a generic label.
pub fn moment_alt(moment: &Post) -> &str {
    [moment.image_alt.as_deref(), Some(moment.title.as_str())]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or("Moment image")
}

/// About page for the configured author; `None` renders a normal page
/// explaining that the profile is missing.
pub fn render_about(layout: &Layout, author: Option<&Author>) -> Markup {
    let content = match author {
        Some(author) => html! {
            section.profile {
                @if let Some(avatar) = &author.avatar_url {
                    img src=(avatar) alt="avatar";
                }
                h1.page-title { (author.name) }
                @if let Some(occupation) = &author.occupation {
                    div.muted { (occupation) }
                }
                @if let Some(company) = &author.company {
                    div.muted { (company) }
                }
                ul {
                    @if let Some(email) = &author.email {
                        li { a href={ "mailto:" (email) } { "Mail" } }
                    }
                    @if let Some(github) = &author.github {
                        li { a href=(github) { "GitHub" } }
                    }
                    @if let Some(linkedin) = &author.linkedin {
                        li { a href=(linkedin) { "LinkedIn" } }
                    }
                    @if let Some(twitter) = &author.twitter {
                        li { a href=(twitter) { "Twitter" } }
                    }
                }
            }
            div.post-body {
                (PreEscaped(markdown_to_html(author.bio.as_deref().unwrap_or_default())))
            }
        },
        None => html! {
            h1.page-title { "Author profile not found." }
            p.muted { "The author profile could not be loaded. Check that the content API is running and that the configured author exists." }
        },
    };
    base_document(layout, "About", Section::About, content)
}

pub fn render_not_found(layout: &Layout) -> Markup {
    let content = html! {
        h1.page-title { "404" }
        p { "Sorry, we couldn't find this page." }
        p { a href="/" { "Back to homepage" } }
    };
    base_document(layout, "Page Not Found", Section::Home, content)
}

/// Shown when a generated document (feed) cannot be produced.
pub fn render_unavailable(layout: &Layout, what: &str) -> Markup {
    let content = html! {
        h1.page-title { "Temporarily unavailable" }
        p { "The " (what) " could not be generated right now." }
    };
    base_document(layout, "Unavailable", Section::Home, content)
}

// ============================================================================
// Text helpers
// ============================================================================

/// GitHub-flavored markdown to HTML. Raw HTML is passed through.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// First `max` characters of `text` followed by "…", or `text` unchanged
/// when it fits.
pub fn truncate_chars(text: &str, max: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max) {
        Some((cut, _)) => Cow::Owned(format!("{}…", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// "March 1, 2024"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// "Friday, March 1, 2024"
pub fn format_date_long(date: &DateTime<Utc>) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn twitter_handle(url: &str) -> String {
    url.replace("https://twitter.com/", "@")
        .replace("https://x.com/", "@")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::pagination::paginate;
    use crate::taxonomy::build_tree;
    use crate::test_helpers::{assert_contains_all, author, category, moment, post, test_config};
    use crate::types::PdfAttachment;
    use std::num::NonZeroUsize;

    fn layout() -> Layout {
        Layout::new(&test_config())
    }

    fn degraded<T>() -> Listing<T> {
        Listing::Degraded(GatewayError::Status {
            url: "posts".into(),
            status: 500,
        })
    }

    #[test]
    fn base_document_includes_doctype_and_inline_css() {
        let doc = base_document(&layout(), "Tags", Section::Tags, html! { p { "x" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert_contains_all(&doc, &["--color-bg", ".post-list", "<title>Tags | Test Notes</title>"]);
    }

    #[test]
    fn nav_marks_current_section() {
        let header = site_header(&layout(), Section::Tags).into_string();
        assert!(header.contains(r#"<li class="current"><a href="/tags">"#));
        assert_eq!(header.matches("current").count(), 1);
    }

    #[test]
    fn home_caps_posts_and_links_to_all() {
        let posts: Vec<Post> = (1..=7)
            .map(|i| post(i, &format!("Post {i}"), "2024-01-01"))
            .collect();
        let html = render_home(&layout(), &Listing::Items(posts), 5).into_string();
        assert_eq!(html.matches("Read more →").count(), 5);
        assert!(html.contains("All Posts →"));
    }

    #[test]
    fn home_without_posts_says_so() {
        let html = render_home(&layout(), &Listing::Items(vec![]), 5).into_string();
        assert!(html.contains("No posts found."));
        assert!(!html.contains("All Posts"));
        assert!(!html.contains(DEGRADED_NOTICE));
    }

    #[test]
    fn home_degraded_shows_notice() {
        let html = render_home(&layout(), &degraded(), 5).into_string();
        assert_contains_all(&html, &["No posts found.", DEGRADED_NOTICE]);
    }

    #[test]
    fn page_href_first_page_is_base() {
        assert_eq!(page_href("/blog", 1), "/blog");
        assert_eq!(page_href("/blog", 3), "/blog/page/3");
        assert_eq!(page_href("/tags/rust", 2), "/tags/rust/page/2");
    }

    #[test]
    fn pagination_nav_middle_page() {
        let nav = pagination_nav("/blog", 2, 3).into_string();
        assert_contains_all(
            &nav,
            &[r#"href="/blog""#, "2 of 3", r#"href="/blog/page/3""#],
        );
    }

    #[test]
    fn pagination_nav_edges_disable_links() {
        let first = pagination_nav("/blog", 1, 3).into_string();
        assert!(first.contains(r#"<span class="disabled">Previous</span>"#));
        let last = pagination_nav("/blog", 3, 3).into_string();
        assert!(last.contains(r#"<span class="disabled">Next</span>"#));
        assert!(pagination_nav("/blog", 1, 1).into_string().is_empty());
    }

    #[test]
    fn listing_renders_page_and_navigation() {
        let posts: Vec<Post> = (1..=12)
            .map(|i| post(i, &format!("Post {i}"), "2024-01-01"))
            .collect();
        let page = ListingPage {
            title: "All Posts",
            base_path: "/blog",
            section: Section::Blog,
            body: ListingBody::Page(paginate(&posts, NonZeroUsize::new(5).unwrap(), 3)),
            degraded: false,
        };
        let html = render_listing(&layout(), &page).into_string();
        assert_contains_all(&html, &["Post 11", "Post 12", "3 of 3", r#"href="/blog/page/2""#]);
        assert!(!html.contains("Post 10<"));
    }

    #[test]
    fn listing_search_has_no_pagination() {
        let results = vec![post(1, "Rust tips", "2024-01-01")];
        let page = ListingPage {
            title: "All Posts",
            base_path: "/blog",
            section: Section::Blog,
            body: ListingBody::Search {
                query: "rust",
                results: &results,
            },
            degraded: false,
        };
        let html = render_listing(&layout(), &page).into_string();
        assert_contains_all(&html, &["Rust tips", r#"value="rust""#]);
        assert!(!html.contains(r#"class="pagination""#));
    }

    #[test]
    fn empty_search_message() {
        let page = ListingPage {
            title: "All Posts",
            base_path: "/blog",
            section: Section::Blog,
            body: ListingBody::Search {
                query: "zzz",
                results: &[],
            },
            degraded: false,
        };
        let html = render_listing(&layout(), &page).into_string();
        assert!(html.contains("No posts found matching your search."));
    }

    #[test]
    fn post_page_renders_markdown_and_neighbours() {
        let mut current = post(2, "Middle", "2024-02-01");
        current.content = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n\n<aside>raw</aside>".into();
        current.tags = vec!["Machine Learning".into()];
        current.author = Some(crate::types::AuthorRef::Profile(author("default", "Ada")));
        current.pdf_attachments = vec![PdfAttachment {
            id: 1,
            file: "https://cdn.test/notes.pdf".into(),
            description: None,
        }];
        let older = post(1, "Older", "2024-01-01");
        let newer = post(3, "Newer", "2024-03-01");

        let html = render_post(&layout(), &current, Some(&older), Some(&newer)).into_string();
        assert_contains_all(
            &html,
            &[
                "<table>",
                "<del>old</del>",
                "<aside>raw</aside>",
                "Thursday, February 1, 2024",
                "Ada",
                r#"href="/tags/machine-learning""#,
                "notes.pdf",
                r#"href="/blog/older""#,
                r#"href="/blog/newer""#,
            ],
        );
    }

    #[test]
    fn post_title_is_escaped() {
        let p = post(1, "<script>alert(1)</script>", "2024-01-01");
        let html = render_post(&layout(), &p, None, None).into_string();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains(r#"<nav class="post-nav">"#));
    }

    #[test]
    fn tags_sorted_by_name() {
        let tags = Listing::Items(vec![
            crate::test_helpers::tag(1, "zig"),
            crate::test_helpers::tag(2, "Async"),
        ]);
        let html = render_tags(&layout(), &tags).into_string();
        let a = html.find("Async").unwrap();
        let z = html.find(">zig<").unwrap();
        assert!(a < z);
    }

    #[test]
    fn category_tree_nests_children_with_depth() {
        let forest = build_tree(&[
            category(1, "Study", None),
            category(2, "Math", Some(1)),
            category(3, "History", Some(1)),
        ])
        .unwrap();
        let html = render_categories(&layout(), CategoryView::Forest(&forest), false).into_string();
        assert_contains_all(
            &html,
            &[
                r#"<li data-depth="0"><a href="/categories/study">Study</a><ul>"#,
                r#"<li data-depth="1"><a href="/categories/history">History</a></li>"#,
            ],
        );
        assert!(html.find("History").unwrap() < html.find("Math").unwrap());
    }

    #[test]
    fn category_tree_closes_lists_when_climbing_back_up() {
        let forest = build_tree(&[
            category(1, "Study", None),
            category(2, "Math", Some(1)),
            category(3, "Algebra", Some(2)),
            category(4, "History", Some(1)),
            category(5, "Life", None),
        ])
        .unwrap();
        let html = render_category_tree(&forest).into_string();
        assert_eq!(
            html,
            concat!(
                r#"<li data-depth="0"><a href="/categories/life">Life</a></li>"#,
                r#"<li data-depth="0"><a href="/categories/study">Study</a><ul>"#,
                r#"<li data-depth="1"><a href="/categories/history">History</a></li>"#,
                r#"<li data-depth="1"><a href="/categories/math">Math</a><ul>"#,
                r#"<li data-depth="2"><a href="/categories/algebra">Algebra</a></li>"#,
                "</ul></li></ul></li>",
            )
        );
    }

    #[test]
    fn leaf_node_has_no_nested_list() {
        let forest = build_tree(&[category(1, "Solo", None)]).unwrap();
        let html = render_category_tree(&forest).into_string();
        assert_eq!(html, r#"<li data-depth="0"><a href="/categories/solo">Solo</a></li>"#);
    }

    #[test]
    fn empty_root_message() {
        let html = render_categories(&layout(), CategoryView::EmptyRoot("study"), false).into_string();
        assert!(html.contains("No sub-categories found under 'study'."));
    }

    #[test]
    fn moments_fallbacks() {
        let mut with_alt = moment(1, "Sunset", "2024-05-03");
        with_alt.image_alt = Some("Orange sky".into());
        with_alt.image_url = Some("https://cdn.test/sunset.jpg".into());
        with_alt.content = "a".repeat(120);
        let bare = moment(2, "Rain", "2024-05-04");

        assert_eq!(moment_alt(&with_alt), "Orange sky");
        assert_eq!(moment_alt(&bare), "Rain");
        let mut untitled = moment(3, "", "2024-05-05");
        untitled.title = String::new();
        assert_eq!(moment_alt(&untitled), "Moment image");

        let html = render_moments(&layout(), &Listing::Items(vec![with_alt, bare]), 100).into_string();
        assert_contains_all(
            &html,
            &[
                "May 3",
                "2024",
                "https://cdn.test/sunset.jpg",
                "data:image/svg+xml",
                &format!("{}…", "a".repeat(100)),
            ],
        );
    }

    #[test]
    fn about_renders_bio_markdown() {
        let mut ada = author("default", "Ada");
        ada.bio = Some("I write **code**.".into());
        ada.github = Some("https://github.com/ada".into());
        let html = render_about(&layout(), Some(&ada)).into_string();
        assert_contains_all(&html, &["<strong>code</strong>", "https://github.com/ada"]);
    }

    #[test]
    fn about_without_author_is_a_normal_page() {
        let html = render_about(&layout(), None).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Author profile not found."));
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo", 2), "hé…");
        assert_eq!(truncate_chars("abc", 3), "abc");
    }

    #[test]
    fn markdown_tasklists_and_footnotes() {
        let html = markdown_to_html("- [x] done\n\nText[^1]\n\n[^1]: note");
        assert!(html.contains(r#"type="checkbox""#));
        assert!(html.contains("footnote"));
    }
}
