use clap::{Parser, Subcommand};
use quire::gateway::ContentGateway;
use quire::site::Site;
use quire::{config, export, output, serve};
use std::path::PathBuf;
use std::sync::Arc;

fn version_string() -> &'static str {
    if env!("QUIRE_RELEASE_TAG") == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("QUIRE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once at startup.
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Server-rendered front end for a headless blog content API")]
#[command(long_about = "\
Server-rendered front end for a headless blog content API

Posts, tags, categories and author profiles live behind a JSON content API.
Quire fetches them on every request and renders plain HTML pages, an RSS
feed and a sitemap, either live or exported to a directory of static files.

Routes:

  /                                # Newest posts
  /blog, /blog/page/2, /blog?q=rust
  /blog/<slug>                     # Post, with previous/next article
  /tags, /tags/<slug>, /tags/<slug>/feed.xml
  /categories                      # Category tree
  /categories/<slug>
  /categories/thought              # Thoughts listing
  /categories/moment, /moments     # Moment cards
  /about                           # Author profile
  /feed.xml, /sitemap.xml

The content API base URL comes from [api].base_url in quire.toml, or from
the CONTENT_API_URL environment variable when set.

Run 'quire gen-config' to generate a documented quire.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (stock defaults apply when it does not exist)
    #[arg(long, default_value = "quire.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the site over HTTP
    Serve,
    /// Render every route to static files
    Export {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Fetch all content and report what the API serves
    Check,
    /// Print a stock quire.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => {
            let site = Arc::new(build_site(&cli.config)?);
            let serve_config = &site.config().serve;
            let (server, addr) = serve::bind(serve_config)?;
            let workers = serve_config.workers;
            output::print_serve_banner(addr, site.config().api.base_url.as_str());
            serve::run(site, server, workers)?;
        }
        Command::Export { output: dir } => {
            let site = build_site(&cli.config)?;
            let summary = export::export(&site, &dir)?;
            output::print_export_output(&summary, &dir);
        }
        Command::Check => {
            let site = build_site(&cli.config)?;
            let inventory = site.inventory();
            let healthy =
                output::print_check_output(&inventory, site.config().api.base_url.as_str());
            if !healthy {
                return Err("content check failed".into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn build_site(
    config_path: &std::path::Path,
) -> Result<Site<quire::gateway::HttpTransport>, Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;
    let gateway = ContentGateway::connect(config.gateway_config()?)?;
    log::info!("content API at {}", config.api.base_url);
    Ok(Site::new(config, gateway))
}
