//! RSS 2.0 feeds.
//!
//! One channel for the blog as a whole and one per tag. Items link to
//! `{site}/blog/{slug}`, carry the post summary as description and one
//! `<category>` per tag. The channel is validated before it is serialized.

use crate::config::SiteConfig;
use crate::types::Post;
use rss::validation::Validate;
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("RSS validation failed: {0}")]
    Invalid(#[from] rss::validation::ValidationError),
}

/// Serialize `posts` (newest first) as an RSS channel.
///
/// `title_suffix` distinguishes tag feeds, e.g. `Some("rust")` titles the
/// channel "Site - rust".
pub fn build_feed(
    config: &SiteConfig,
    posts: &[Post],
    title_suffix: Option<&str>,
) -> Result<String, FeedError> {
    let site_url = config.site_url();
    let contact = config.contact();

    let items: Vec<rss::Item> = posts
        .iter()
        .map(|post| post_to_item(post, site_url, &contact))
        .collect();

    let title = match title_suffix {
        Some(suffix) => format!("{} - {suffix}", config.site.title),
        None => config.site.title.clone(),
    };

    let mut builder = ChannelBuilder::default();
    builder
        .title(title)
        .link(format!("{site_url}/blog"))
        .description(config.site.description.clone())
        .language(config.site.language.clone())
        .managing_editor(contact.clone())
        .webmaster(contact)
        .generator(format!("quire {}", env!("CARGO_PKG_VERSION")))
        .items(items);
    if let Some(newest) = posts.iter().map(|p| p.created_at).max() {
        builder.last_build_date(newest.to_rfc2822());
    }
    let channel = builder.build();

    channel.validate()?;
    Ok(channel.to_string())
}

fn post_to_item(post: &Post, site_url: &str, contact: &str) -> rss::Item {
    let link = format!("{site_url}/blog/{}", post.slug);
    let categories = post
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
        .collect::<Vec<_>>();

    ItemBuilder::default()
        .title(post.title.clone())
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .description((!post.summary.is_empty()).then(|| post.summary.clone()))
        .pub_date(post.created_at.to_rfc2822())
        .author(contact.to_string())
        .categories(categories)
        .build()
}
