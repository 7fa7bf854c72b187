//! SHOW command - One item by slug.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

use campus_client::{CmsClient, ContentRepository, ViewLatch};
use campus_core::{ContentItem, ContentKind};

use super::{HumanReadable, format_date, output};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Content kind: blogs, events or case-studies
    pub kind: ContentKind,

    /// Slug of the item
    pub slug: String,

    /// Do not count this as a view
    #[arg(long)]
    pub no_view: bool,
}

impl HumanReadable for ContentItem {
    fn print_human(&self) {
        println!("{}", self.title.green().bold());
        println!("{}", "=".repeat(60));
        println!("{} {}", "ID:".cyan(), self.id);
        println!("{} {}", "Kind:".cyan(), self.kind.label());
        println!("{} {}", "Slug:".cyan(), self.slug);
        if let Some(date) = &self.date {
            println!("{} {}", "Date:".cyan(), format_date(date));
        }
        if let Some(ends_at) = &self.ends_at {
            println!("{} {}", "Ends:".cyan(), format_date(ends_at));
        }
        if let Some(location) = &self.location {
            println!("{} {}", "Location:".cyan(), location);
        }
        if let Some(cover) = &self.cover {
            println!("{} {}", "Cover:".cyan(), cover.url);
        }
        if !self.categories.is_empty() {
            let names: Vec<&str> = self.categories.iter().map(|c| c.name.as_str()).collect();
            println!("{} {}", "Categories:".cyan(), names.join(", "));
        }
        if !self.tags.is_empty() {
            let names: Vec<&str> = self.tags.iter().map(|t| t.name.as_str()).collect();
            println!("{} {}", "Tags:".cyan(), names.join(", "));
        }
        println!("{} {}", "Views:".cyan(), self.views);

        if let Some(summary) = &self.summary {
            println!();
            println!("{}", summary.italic());
        }
        if let Some(body) = &self.body {
            println!();
            println!("{}", "Body:".cyan());
            println!("{}", "-".repeat(60));
            println!("{}", body);
            println!("{}", "-".repeat(60));
        }
    }
}

/// Execute the show command.
pub async fn execute(client: &CmsClient, human: bool, args: ShowArgs) -> Result<()> {
    let repository = ContentRepository::new(client);

    let Some(item) = repository.detail(args.kind, &args.slug).await? else {
        bail!("{} '{}' not found", args.kind.label(), args.slug);
    };

    if !args.no_view {
        let latch = ViewLatch::new();
        latch.record(client, item.kind, item.id).await;
    }

    output(&item, human)
}
