//! # Quire
//!
//! A server-rendered front end for a headless blog. Posts, tags, categories
//! and author profiles live behind a JSON content API; Quire fetches them
//! per request and renders plain HTML, an RSS feed and a sitemap.
//!
//! # Architecture: Fetch, Shape, Render
//!
//! Every request flows through the same three steps:
//!
//! ```text
//! 1. Fetch    content API  →  Listing / Lookup      (gateway)
//! 2. Shape    records      →  pages, trees, feeds   (pagination, taxonomy, feed, sitemap)
//! 3. Render   shaped data  →  Response              (render, site)
//! ```
//!
//! [`site::Site`] owns the first two steps and answers a [`site::Route`] with
//! a [`site::Response`]. The two surfaces, [`serve`] and [`export`], are thin:
//! one writes responses to sockets, the other to files.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`gateway`] | Content API client: transport seam, response envelopes, degraded outcomes |
//! | [`site`] | Route parsing and per-route orchestration of fetch and render |
//! | [`render`] | Maud page templates and markdown rendering |
//! | [`pagination`] | Page slicing and page-number validation |
//! | [`taxonomy`] | Category forest construction with cycle rejection |
//! | [`feed`] | RSS 2.0 channels for all posts and per tag |
//! | [`sitemap`] | `sitemap.xml` generation |
//! | [`serve`] | tiny_http listener and worker pool |
//! | [`export`] | Static export of every reachable route |
//! | [`config`] | `quire.toml` loading, validation, merging, and CSS generation |
//! | [`types`] | Wire records shared by every module (`Post`, `Tag`, `Category`, `Author`) |
//! | [`output`] | CLI output formatting for `check`, `export` and `serve` |
//!
//! # Design Decisions
//!
//! ## Degraded, Not Failed
//!
//! A content API that is down or answers garbage never turns into a 500.
//! Collection fetches come back as [`gateway::Listing::Degraded`] and render
//! as empty sections with a notice; keyed lookups distinguish a real 404
//! ([`gateway::Lookup::NotFound`]) from an outage. The only page that answers
//! 503 is a feed whose channel fails validation.
//!
//! ## Explicit Transport
//!
//! The gateway is generic over [`gateway::Transport`]. Production wires in a
//! blocking reqwest client built once from [`gateway::GatewayConfig`]; tests
//! hand in canned responses. No process-wide client, no globals.
//!
//! ## Cycles Are Rejected
//!
//! Category parents come from remote data. [`taxonomy::build_tree`] refuses
//! a parent chain that loops back on itself instead of recursing forever;
//! the category page shows a notice and `quire check` fails.
//!
//! ## One Renderer, Two Surfaces
//!
//! `quire serve` and `quire export` call the same [`site::Site::respond`]; an
//! exported file holds the body the server answers for that route.

pub mod config;
pub mod export;
pub mod feed;
pub mod gateway;
pub mod output;
pub mod pagination;
pub mod render;
pub mod serve;
pub mod site;
pub mod sitemap;
pub mod taxonomy;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
