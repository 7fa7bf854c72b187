//! RECENT command - Latest items of a kind.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use campus_client::{CmsClient, ContentRepository};
use campus_core::{ContentId, ContentKind};

use super::{ListingOutput, output};

/// Arguments for the recent command.
#[derive(Args)]
pub struct RecentArgs {
    /// Content kind: blogs, events or case-studies
    pub kind: ContentKind,

    /// Id of an item to leave out
    #[arg(long)]
    pub exclude: Option<ContentId>,

    /// Maximum number of items
    #[arg(long, default_value_t = 3)]
    pub limit: u32,
}

/// Execute the recent command.
///
/// Like the "read next" sections it backs, this never fails on CMS errors.
pub async fn execute(client: &CmsClient, human: bool, args: RecentArgs) -> Result<()> {
    let repository = ContentRepository::new(client);
    let page = repository.recent(args.kind, args.exclude, args.limit).await;

    if human {
        println!("{} {}", "Recent".green().bold(), args.kind.label().green().bold());
        println!("{}", "=".repeat(60));
        println!();
    }
    output(&ListingOutput::from(page), human)
}
