//! Command-line interface for the campus site CMS.
//!
//! This CLI tool reads content the way the site does:
//! - list: One listing page
//! - recent: Latest items, leaving one out
//! - show: One item by slug, counting a view
//! - browse: Page through a listing, optionally searching
//! - submit: Send a contact or enquiry form
//!
//! Configuration via environment:
//! - CMS_URL: Base URL of the CMS (default: http://localhost:1337)
//! - CMS_API_TOKEN: Bearer token for server-context requests
//! - CMS_PUBLIC_URL: Base URL for browser-context requests (default: CMS_URL)
//! - CMS_PUBLIC_TOKEN: Public token for browser-context requests
//! - CMS_ASSET_URL: Base for relative image URLs
//! - CMS_ASSET_HOSTS: Comma-separated image host allow-list
//! - CMS_TIMEOUT_SECS: Request timeout in seconds (default: 10)
//! - RUST_LOG: Log filter for diagnostics on stderr (default: warn)

mod commands;

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use campus_client::{ClientConfig, CmsClient, CmsEndpoint, ExecutionContext};

use commands::{
    browse::BrowseArgs, list::ListArgs, recent::RecentArgs, show::ShowArgs, submit::SubmitArgs,
};

/// Campus CMS CLI
///
/// Inspect blogs, events and case studies as the site sees them. Prints
/// JSON by default; use --human for formatted output.
#[derive(Parser)]
#[command(name = "campus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// CMS base URL
    #[arg(long, env = "CMS_URL", default_value = "http://localhost:1337", global = true)]
    url: Url,

    /// Bearer token for server-context requests
    #[arg(long, env = "CMS_API_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// CMS base URL for browser-context requests (default: --url)
    #[arg(long, env = "CMS_PUBLIC_URL", global = true)]
    public_url: Option<Url>,

    /// Public token for browser-context requests
    #[arg(long, env = "CMS_PUBLIC_TOKEN", global = true, hide_env_values = true)]
    public_token: Option<String>,

    /// Base for relative image URLs (default: the endpoint URL)
    #[arg(long, env = "CMS_ASSET_URL", global = true)]
    asset_url: Option<Url>,

    /// Hosts images may be loaded from
    #[arg(long, env = "CMS_ASSET_HOSTS", value_delimiter = ',', global = true)]
    asset_hosts: Vec<String>,

    /// Execution context the requests imitate (server or browser)
    #[arg(long, default_value = "server", global = true)]
    context: ExecutionContext,

    /// Request timeout in seconds
    #[arg(long, env = "CMS_TIMEOUT_SECS", default_value_t = 10, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Both endpoints; the browser one falls back to the server URL.
    fn client_config(&self) -> ClientConfig {
        let token = |t: &Option<String>| t.clone().filter(|t| !t.trim().is_empty());

        let mut config = ClientConfig::new(self.url.clone(), token(&self.token));
        config.browser = CmsEndpoint {
            base_url: self.public_url.clone().unwrap_or_else(|| self.url.clone()),
            token: token(&self.public_token),
        };
        config.asset_base = self.asset_url.clone();
        config.asset_hosts = self
            .asset_hosts
            .iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        config.timeout = Duration::from_secs(self.timeout);
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of blogs, events or case studies
    List(ListArgs),

    /// Show the latest items of a kind
    Recent(RecentArgs),

    /// Show one item by slug and count a view
    Show(ShowArgs),

    /// Page through a listing like the site's "load more"
    Browse(BrowseArgs),

    /// Submit a contact or enquiry form
    Submit(SubmitArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    let client = match CmsClient::new(&cli.client_config(), cli.context) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(&client, cli.human, args).await,
        Commands::Recent(args) => commands::recent::execute(&client, cli.human, args).await,
        Commands::Show(args) => commands::show::execute(&client, cli.human, args).await,
        Commands::Browse(args) => commands::browse::execute(client, cli.human, args).await,
        Commands::Submit(args) => commands::submit::execute(&client, cli.human, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so JSON on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
