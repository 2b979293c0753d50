//! site-profiler CLI
//!
//! Identify tracker sites and extract listings from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use site_profiler::{
    error::Result,
    models::{FetchConfig, SiteContext},
    services::ProfileMatcher,
    store::TemplateStore,
    utils::http::HttpFetcher,
};

/// site-profiler - tracker site identification and extraction
#[derive(Parser, Debug)]
#[command(name = "site-profiler", version, about = "Tracker site profiler")]
struct Cli {
    /// Directory containing profile definitions
    #[arg(short, long, default_value = "profiles")]
    profiles_dir: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// User agent for outgoing requests
    #[arg(long)]
    user_agent: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known profiles
    List,

    /// Load the profile directory and report what validates
    Validate,

    /// Identify which profile matches a site
    Identify {
        /// Base URL of the site
        url: String,

        /// Comma-separated profile ids to check, most specific first
        /// (default: every known profile in id order)
        #[arg(long)]
        order: Option<String>,

        /// Read the page from a file instead of fetching
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Extract records from a site using a profile schema
    Parse {
        /// Base URL of the page to parse
        url: String,

        /// Profile id to parse with
        #[arg(long)]
        profile: String,

        /// Schema name on the profile
        #[arg(long, default_value = "list")]
        schema: String,

        /// Read the page from a file instead of fetching
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_context(url: &str, html: Option<&PathBuf>) -> Result<SiteContext> {
    let mut ctx = SiteContext::new(url);
    if let Some(path) = html {
        ctx = ctx.with_html(std::fs::read_to_string(path)?);
    }
    Ok(ctx)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = Arc::new(TemplateStore::from_dir(&cli.profiles_dir)?);
    log::info!(
        "Loaded {} profiles from {}",
        store.len(),
        cli.profiles_dir.display()
    );

    let config = FetchConfig {
        timeout_secs: cli.timeout_secs,
        ..FetchConfig::default()
    };
    let config = match cli.user_agent {
        Some(user_agent) => FetchConfig {
            user_agent,
            ..config
        },
        None => config,
    };
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let matcher = ProfileMatcher::new(Arc::clone(&store), fetcher);

    match cli.command {
        Command::List => {
            for id in store.list_profile_ids() {
                if let Some(profile) = store.get(&id) {
                    println!(
                        "{}  family={}  version={}  schemas={}",
                        id,
                        profile.meta.family,
                        profile.meta.version,
                        profile
                            .schemas
                            .keys()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(",")
                    );
                }
            }
        }

        Command::Validate => {
            // Invalid files were already warned about during the load.
            log::info!("{} profiles validated", store.len());
            for id in store.list_profile_ids() {
                log::info!("  ✓ {}", id);
            }
        }

        Command::Identify { url, order, html } => {
            let ctx = build_context(&url, html.as_ref())?;
            let ids: Vec<String> = match order {
                Some(order) => order.split(',').map(|s| s.trim().to_string()).collect(),
                None => store.list_profile_ids(),
            };
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

            match matcher.identify(&ctx, &ids).await {
                Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                None => log::warn!("no profile matched {}", url),
            }
        }

        Command::Parse {
            url,
            profile,
            schema,
            html,
        } => {
            let ctx = build_context(&url, html.as_ref())?;
            let records = matcher.parse(&ctx, &profile, &schema).await?;
            log::info!("{} records extracted", records.len());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}
