//! BROWSE command - Page through a listing like the site's "load more".

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use campus_client::{CmsClient, InfiniteListing};
use campus_core::{ContentItem, ContentKind, ListQuery};

use super::{HumanReadable, output, print_items};

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Content kind: blogs, events or case-studies
    pub kind: ContentKind,

    /// Search term; restarts the listing from page 1
    #[arg(long)]
    pub search: Option<String>,

    /// Items per page
    #[arg(long, default_value_t = campus_core::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Stop after this many pages
    #[arg(long, default_value_t = 3)]
    pub max_pages: u32,

    /// Category slug
    #[arg(long)]
    pub category: Option<String>,
}

/// Accumulated result of a browse session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseOutput {
    pub kind: ContentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub pages_fetched: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub has_next_page: bool,
    pub items: Vec<ContentItem>,
}

impl HumanReadable for BrowseOutput {
    fn print_human(&self) {
        println!("{}", self.kind.label().green().bold());
        if let Some(search) = &self.search {
            println!("{} {}", "Search:".cyan(), search);
        }
        println!("{}", "=".repeat(60));
        println!();

        print_items(&self.items);

        println!(
            "  {} {} pages, {} of {} items",
            "Fetched:".cyan(),
            self.pages_fetched,
            self.items.len(),
            self.total.unwrap_or(0)
        );
        if self.has_next_page {
            println!("  {}", "More pages available (raise --max-pages)".dimmed());
        }
    }
}

/// Execute the browse command.
///
/// A failed page ends the session with an error.
pub async fn execute(client: CmsClient, human: bool, args: BrowseArgs) -> Result<()> {
    let base = ListQuery {
        category: args.category.clone(),
        ..ListQuery::first(args.page_size)
    };
    let mut listing = InfiniteListing::new(client, args.kind, base);
    listing.set_search(args.search.clone());

    for _ in 0..args.max_pages {
        if !listing.fetch_next_page().await? {
            break;
        }
    }

    let result = BrowseOutput {
        kind: args.kind,
        search: listing.search().map(String::from),
        pages_fetched: listing.pages().len(),
        total: listing.total(),
        has_next_page: listing.has_next_page(),
        items: listing.items().cloned().collect(),
    };
    output(&result, human)
}
