//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Content API
//!     http://localhost:8000/api
//! Posts
//!     12 blog, 3 moment
//! Tags
//!     5 tags
//! Categories
//!     Study (study)
//!         History (history)
//!         Math (math)
//! ```
//!
//! ## Export
//!
//! ```text
//! 001 / → index.html
//! 002 /blog → blog/index.html
//! 003 /blog/page/2 → blog/page/2/index.html
//!
//! Skipped
//!     /blog/draft (404)
//!
//! Exported 3 files to dist
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::export::ExportSummary;
use crate::gateway::Listing;
use crate::site::Inventory;
use crate::taxonomy::{self, CategoryNode};
use crate::types::PostType;
use std::net::SocketAddr;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Category tree
// ============================================================================

/// One line per category, children indented one level below their parent.
///
/// ```text
/// Study (study)
///     History (history)
/// ```
pub fn format_category_tree(forest: &[CategoryNode], base_depth: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(taxonomy::node_count(forest));
    taxonomy::walk(forest, |node, depth| {
        lines.push(format!(
            "{}{} ({})",
            indent(base_depth + depth),
            node.name,
            node.slug
        ));
    });
    lines
}

// ============================================================================
// Check
// ============================================================================

fn count_line<T>(listing: &Listing<T>, noun: &str) -> String {
    match listing {
        Listing::Items(items) => format!("{}{} {noun}", indent(1), items.len()),
        Listing::Degraded(e) => format!("{}unavailable: {e}", indent(1)),
    }
}

/// Content inventory. Returns the lines and whether the content is healthy:
/// every collection loaded and the category tree is well formed.
pub fn format_check_output(inventory: &Inventory, api_url: &str) -> (Vec<String>, bool) {
    let mut lines = vec!["Content API".to_string(), format!("{}{api_url}", indent(1))];

    lines.push("Posts".to_string());
    match &inventory.posts {
        Listing::Items(_) => lines.push(format!(
            "{}{} blog, {} moment",
            indent(1),
            inventory.count_of(PostType::Blog),
            inventory.count_of(PostType::Moment)
        )),
        degraded => lines.push(count_line(degraded, "posts")),
    }

    lines.push("Tags".to_string());
    lines.push(count_line(&inventory.tags, "tags"));

    lines.push("Categories".to_string());
    let tree_ok = match (&inventory.categories, inventory.category_tree()) {
        (Listing::Degraded(_), _) => {
            lines.push(count_line(&inventory.categories, "categories"));
            true
        }
        (_, Ok(forest)) if forest.is_empty() => {
            lines.push(format!("{}(none)", indent(1)));
            true
        }
        (_, Ok(forest)) => {
            lines.extend(format_category_tree(&forest, 1));
            true
        }
        (_, Err(e)) => {
            lines.push(format!("{}rejected: {e}", indent(1)));
            false
        }
    };

    let healthy = tree_ok && inventory.degraded().is_empty();
    (lines, healthy)
}

/// Print check output to stdout. Returns whether the content is healthy.
pub fn print_check_output(inventory: &Inventory, api_url: &str) -> bool {
    let (lines, healthy) = format_check_output(inventory, api_url);
    for line in lines {
        println!("{}", line);
    }
    healthy
}

// ============================================================================
// Export
// ============================================================================

pub fn format_export_output(summary: &ExportSummary, output_dir: &Path) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .written
        .iter()
        .enumerate()
        .map(|(i, page)| {
            format!(
                "{} {} → {}",
                format_index(i + 1),
                page.route,
                page.file.display()
            )
        })
        .collect();

    if !summary.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for (route, reason) in &summary.skipped {
            lines.push(format!("{}{route} ({reason})", indent(1)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Exported {} files to {}",
        summary.written.len(),
        output_dir.display()
    ));
    lines
}

pub fn print_export_output(summary: &ExportSummary, output_dir: &Path) {
    for line in format_export_output(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Serve
// ============================================================================

pub fn format_serve_banner(addr: SocketAddr, api_url: &str) -> Vec<String> {
    vec![
        format!("Serving on http://{addr}"),
        format!("{}Content API: {api_url}", indent(1)),
        format!("{}Press Ctrl+C to stop", indent(1)),
    ]
}

pub fn print_serve_banner(addr: SocketAddr, api_url: &str) {
    for line in format_serve_banner(addr, api_url) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
