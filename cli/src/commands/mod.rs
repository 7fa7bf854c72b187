//! Command implementations for the campus CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod browse;
pub mod list;
pub mod recent;
pub mod show;
pub mod submit;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use campus_core::{ContentItem, Page, Pagination};

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// One listing page as printed by `list` and `recent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingOutput {
    pub items: Vec<ContentItem>,
    pub pagination: Pagination,
    pub has_next_page: bool,
}

impl From<Page<ContentItem>> for ListingOutput {
    fn from(page: Page<ContentItem>) -> Self {
        Self {
            has_next_page: page.has_next_page(),
            items: page.items,
            pagination: page.pagination,
        }
    }
}

impl HumanReadable for ListingOutput {
    fn print_human(&self) {
        print_items(&self.items);
        println!(
            "  {} page {} of {} ({} items)",
            "Pagination:".cyan(),
            self.pagination.page,
            self.pagination.page_count,
            self.pagination.total
        );
        if self.has_next_page {
            println!("  {}", "More pages available".dimmed());
        }
    }
}

/// Print one summary block per item.
pub fn print_items(items: &[ContentItem]) {
    if items.is_empty() {
        println!("  {}", "(No content)".dimmed());
        println!();
        return;
    }

    for item in items {
        println!("  {} {}", item.title.bold(), format!("#{}", item.id).dimmed());
        println!("    {} {}", "Slug:".cyan(), item.slug);
        if let Some(date) = &item.date {
            println!("    {} {}", "Date:".cyan(), format_date(date));
        }
        if let Some(summary) = &item.summary {
            println!("    {} {}", "Summary:".cyan(), truncate(summary, 100));
        }
        if !item.categories.is_empty() {
            let names: Vec<&str> = item.categories.iter().map(|c| c.name.as_str()).collect();
            println!("    {} {}", "Categories:".cyan(), names.join(", "));
        }
        println!();
    }
}

/// Format a date for human display.
pub fn format_date(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
