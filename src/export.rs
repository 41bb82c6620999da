//! Static export.
//!
//! Renders every route the content makes reachable and writes each response
//! to a file under an output directory, so the site can be hosted without
//! the server:
//!
//! ```text
//! dist/
//! ├── index.html                     # /
//! ├── 404.html
//! ├── feed.xml                       # /feed.xml
//! ├── sitemap.xml
//! ├── blog/
//! │   ├── index.html                 # /blog
//! │   ├── page/2/index.html          # /blog/page/2
//! │   └── hello-world/index.html     # /blog/hello-world
//! └── tags/
//!     └── rust/
//!         ├── index.html
//!         └── feed.xml
//! ```
//!
//! Listings are exported page by page until the first page that does not
//! exist. Routes that answer with anything other than 200, or whose path
//! cannot be a file inside the output directory, are reported as skipped
//! rather than written. Content routes whose path the server would resolve
//! to a different route (a category called `moment`) are not planned at all.

use crate::gateway::Transport;
use crate::site::{ListingQuery, Response, Route, Site};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("route {0} does not map to a file inside the output directory")]
    UnsafePath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPage {
    pub route: String,
    /// Relative to the output directory.
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Rendered with this status instead of 200.
    Status(u16),
    /// The route path does not map to a file inside the output directory.
    UnsafePath,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Status(status) => write!(f, "{status}"),
            SkipReason::UnsafePath => f.write_str("unsafe path"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<ExportedPage>,
    /// Routes that were rendered but not written, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
}

/// A unit of export work: one page, or every page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Job {
    Page(Route),
    Listing(Route),
}

/// Render everything and write it below `output_dir`.
pub fn export<T: Transport>(site: &Site<T>, output_dir: &Path) -> Result<ExportSummary, ExportError> {
    let jobs = plan(site);
    log::info!("exporting {} routes to {}", jobs.len(), output_dir.display());

    let rendered: Vec<(String, Response)> = jobs
        .par_iter()
        .flat_map_iter(|job| render_job(site, job))
        .collect();

    let mut summary = ExportSummary::default();
    for (route, response) in rendered {
        if response.status != 200 {
            summary.skipped.push((route, SkipReason::Status(response.status)));
            continue;
        }
        let file = match output_path(&route) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("skipping {e}");
                summary.skipped.push((route, SkipReason::UnsafePath));
                continue;
            }
        };
        write_file(&output_dir.join(&file), &response.body)?;
        summary.written.push(ExportedPage { route, file });
    }

    let not_found = PathBuf::from("404.html");
    write_file(&output_dir.join(&not_found), &site.not_found().body)?;
    summary.written.push(ExportedPage {
        route: "/404".into(),
        file: not_found,
    });

    Ok(summary)
}

fn plan<T: Transport>(site: &Site<T>) -> Vec<Job> {
    let mut jobs = vec![
        Job::Page(Route::Home),
        Job::Listing(Route::Blog(ListingQuery::default())),
        Job::Page(Route::Tags),
        Job::Page(Route::Categories),
        Job::Listing(Route::Thoughts(ListingQuery::default())),
        Job::Page(Route::Moments),
        Job::Page(Route::About),
        Job::Page(Route::Feed),
        Job::Page(Route::Sitemap),
    ];

    let inventory = site.inventory();
    for degraded in inventory.degraded() {
        log::warn!("exporting without {degraded}: the content API did not answer");
    }
    jobs.extend(
        inventory
            .posts
            .items()
            .iter()
            .map(|post| Job::Page(Route::Post(post.slug.clone()))),
    );
    for tag in inventory.tags.items() {
        jobs.push(Job::Listing(Route::Tag {
            slug: tag.slug.clone(),
            query: ListingQuery::default(),
        }));
        jobs.push(Job::Page(Route::TagFeed(tag.slug.clone())));
    }
    jobs.extend(inventory.categories.items().iter().map(|category| {
        Job::Listing(Route::Category {
            slug: category.slug.clone(),
            query: ListingQuery::default(),
        })
    }));

    jobs.retain(|job| {
        let (Job::Page(route) | Job::Listing(route)) = job;
        let reachable = Route::parse(&route.path()) == *route;
        if !reachable {
            log::warn!("not exporting {}: the path serves a different page", route.path());
        }
        reachable
    });
    jobs
}

fn render_job<T: Transport>(site: &Site<T>, job: &Job) -> Vec<(String, Response)> {
    match job {
        Job::Page(route) => vec![(route.path(), site.respond(route))],
        Job::Listing(first) => {
            let mut pages = Vec::new();
            for n in 1.. {
                let route = nth_page(first, n);
                let response = site.respond(&route);
                if response.status != 200 && n > 1 {
                    break;
                }
                let ok = response.status == 200;
                pages.push((route.path(), response));
                if !ok {
                    break;
                }
            }
            pages
        }
    }
}

fn nth_page(route: &Route, n: usize) -> Route {
    let query = ListingQuery::page(n);
    match route {
        Route::Blog(_) => Route::Blog(query),
        Route::Thoughts(_) => Route::Thoughts(query),
        Route::Tag { slug, .. } => Route::Tag {
            slug: slug.clone(),
            query,
        },
        Route::Category { slug, .. } => Route::Category {
            slug: slug.clone(),
            query,
        },
        other => other.clone(),
    }
}

/// File for a route path: documents (`/feed.xml`) keep their name, pages
/// become `{path}/index.html`.
pub fn output_path(route: &str) -> Result<PathBuf, ExportError> {
    let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
    if segments
        .iter()
        .any(|s| *s == "." || *s == ".." || s.contains('\\'))
    {
        return Err(ExportError::UnsafePath(route.to_string()));
    }

    let mut path: PathBuf = segments.iter().collect();
    let is_document = segments.last().is_some_and(|last| last.ends_with(".xml"));
    if !is_document {
        path.push("index.html");
    }
    Ok(path)
}

fn write_file(path: &Path, body: &str) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, body).map_err(io_err)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::Post;
    use tempfile::TempDir;

    #[test]
    fn output_paths() {
        assert_eq!(output_path("/").unwrap(), PathBuf::from("index.html"));
        assert_eq!(
            output_path("/blog/page/2").unwrap(),
            PathBuf::from("blog/page/2/index.html")
        );
        assert_eq!(output_path("/feed.xml").unwrap(), PathBuf::from("feed.xml"));
        assert_eq!(
            output_path("/tags/rust/feed.xml").unwrap(),
            PathBuf::from("tags/rust/feed.xml")
        );
    }

    #[test]
    fn output_path_rejects_traversal() {
        assert!(matches!(
            output_path("/blog/../../etc"),
            Err(ExportError::UnsafePath(_))
        ));
    }

    #[test]
    fn nth_page_keeps_listing_identity() {
        let tag = Route::Tag {
            slug: "rust".into(),
            query: ListingQuery::default(),
        };
        assert_eq!(nth_page(&tag, 3).path(), "/tags/rust/page/3");
        assert_eq!(nth_page(&tag, 1).path(), "/tags/rust");
        assert_eq!(nth_page(&Route::About, 2), Route::About);
    }

    fn fixture() -> MemoryTransport {
        let mut tagged = post(7, "Tagged", "2024-02-01");
        tagged.tags = vec!["Rust".into()];
        let mut blog: Vec<Post> = (1..=6)
            .map(|i| post(i, &format!("Post {i}"), &format!("2024-01-{i:02}")))
            .collect();
        blog.push(tagged.clone());
        let moments = vec![moment(20, "Sunset", "2024-03-01")];
        let mut all = blog.clone();
        all.extend(moments.clone());

        MemoryTransport::new()
            .with_json("posts?type=blog", &blog)
            .with_json("posts?type=moment", &moments)
            .with_json("posts", &all)
            .with_json("posts/post-1", &blog[0])
            .with_json("posts/tagged", &tagged)
            .with_json("tags", &[tag(1, "Rust")])
            .with_json("posts?tag_slug=rust", &[tagged])
            .with_json("categories", &[category(1, "Study", None)])
            .with("posts?category_slug=study", "[]")
            .with("posts?category_slug=thoughts", "[]")
    }

    #[test]
    fn export_writes_listing_pages_posts_and_feeds() {
        let tmp = TempDir::new().unwrap();
        let site = site_with(fixture());
        let summary = export(&site, tmp.path()).unwrap();

        for file in [
            "index.html",
            "404.html",
            "feed.xml",
            "sitemap.xml",
            "blog/index.html",
            "blog/page/2/index.html",
            "blog/post-1/index.html",
            "tags/index.html",
            "tags/rust/index.html",
            "tags/rust/feed.xml",
            "categories/index.html",
            "categories/study/index.html",
            "categories/thought/index.html",
            "categories/moment/index.html",
            "about/index.html",
        ] {
            assert!(tmp.path().join(file).is_file(), "missing {file}");
        }
        assert!(!tmp.path().join("blog/page/3").exists());

        let page_two = std::fs::read_to_string(tmp.path().join("blog/page/2/index.html")).unwrap();
        assert!(page_two.contains("2 of 2"));

        // Posts without a canned detail response are skipped, not written.
        assert!(
            summary
                .skipped
                .iter()
                .any(|(route, reason)| route == "/blog/post-2" && *reason == SkipReason::Status(404))
        );
        assert!(!tmp.path().join("blog/post-2").exists());
    }

    #[test]
    fn export_with_unreachable_api_still_writes_shell() {
        let tmp = TempDir::new().unwrap();
        let site = site_with(MemoryTransport::failing());
        let summary = export(&site, tmp.path()).unwrap();
        assert!(tmp.path().join("index.html").is_file());
        assert!(tmp.path().join("blog/index.html").is_file());
        assert!(summary.written.len() >= 8);
    }

    #[test]
    fn category_shadowed_by_fixed_route_is_not_exported() {
        let tmp = TempDir::new().unwrap();
        let transport = MemoryTransport::new()
            .with_json("posts?type=moment", &[moment(20, "Sunset", "2024-03-01")])
            .with_json("posts?category_slug=moment", &[post(1, "Listed", "2024-01-01")])
            .with_json("categories", &[category(9, "Moment", None)]);
        let summary = export(&site_with(transport), tmp.path()).unwrap();

        let written: Vec<&str> = summary
            .written
            .iter()
            .filter(|page| page.route == "/categories/moment")
            .map(|page| page.route.as_str())
            .collect();
        assert_eq!(written, ["/categories/moment"]);

        let html =
            std::fs::read_to_string(tmp.path().join("categories/moment/index.html")).unwrap();
        assert!(html.contains("Sunset"));
        assert!(!html.contains("Listed"));
    }

    #[test]
    fn unsafe_slug_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut bad = post(2, "Bad", "2024-01-02");
        bad.slug = "..".into();
        let good = post(1, "Good", "2024-01-01");
        let transport = MemoryTransport::new()
            .with_json("posts", &[bad.clone(), good.clone()])
            .with_json("posts?type=blog", &[bad.clone(), good.clone()])
            .with_json("posts/..", &bad)
            .with_json("posts/good", &good);
        let summary = export(&site_with(transport), tmp.path()).unwrap();

        assert!(summary.skipped.contains(&("/blog/..".to_string(), SkipReason::UnsafePath)));
        assert!(tmp.path().join("blog/good/index.html").is_file());
        assert!(tmp.path().join("index.html").is_file());
    }
}
