//! LIST command - One page of a listing.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use campus_client::{CmsClient, ContentRepository};
use campus_core::{ContentKind, ListQuery};

use super::{ListingOutput, output};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Content kind: blogs, events or case-studies
    pub kind: ContentKind,

    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page
    #[arg(long, default_value_t = campus_core::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Case-insensitive search on title and summary
    #[arg(long)]
    pub search: Option<String>,

    /// Category slug
    #[arg(long)]
    pub category: Option<String>,

    /// Tag slug
    #[arg(long)]
    pub tag: Option<String>,

    /// Render an empty page instead of failing when the CMS is unavailable
    #[arg(long)]
    pub fail_soft: bool,
}

impl ListArgs {
    fn query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            page_size: self.page_size,
            search: self.search.clone(),
            category: self.category.clone(),
            tag: self.tag.clone(),
            ..ListQuery::default()
        }
        .normalized()
    }
}

/// Execute the list command.
pub async fn execute(client: &CmsClient, human: bool, args: ListArgs) -> Result<()> {
    let repository = ContentRepository::new(client);
    let query = args.query();

    let page = if args.fail_soft {
        repository.list(args.kind, &query).await
    } else {
        repository.try_list(args.kind, &query).await?
    };

    if human {
        println!("{}", args.kind.label().green().bold());
        println!("{}", "=".repeat(60));
        println!();
    }
    let listing = ListingOutput::from(page);
    output(&listing, human)
}
