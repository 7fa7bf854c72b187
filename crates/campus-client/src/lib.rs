//! campus-client: CMS access for the campus site
//!
//! This crate provides:
//! - The CMS REST client with per-context token selection
//! - A normalized error value for every failure mode
//! - Fail-soft listing access for server-side rendering
//! - Search-keyed infinite pagination
//! - One-shot view counting
//! - A stale-while-revalidate cache for first-page listings
//!
//! ## Modules
//!
//! - [`client`]: HTTP client and request plumbing
//! - [`config`]: Endpoint configuration from the environment
//! - [`error`]: The normalized [`CmsError`]
//! - [`repository`]: The [`ContentSource`] seam and fail-soft [`ContentRepository`]
//! - [`infinite`]: Page sequences keyed by search term
//! - [`views`]: The view-count latch
//! - [`cache`]: Listing cache with timed revalidation
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use campus_client::{ClientConfig, CmsClient, ContentRepository, ExecutionContext};
//! use campus_client::campus_core::{ContentKind, ListQuery};
//!
//! let config = ClientConfig::from_env()?;
//! let client = CmsClient::new(&config, ExecutionContext::Server)?;
//! let repo = ContentRepository::new(client);
//!
//! // Never fails: an unreachable CMS yields an empty page
//! let page = repo.list(ContentKind::Blog, &ListQuery::default()).await;
//! println!("{} of {} posts", page.items.len(), page.pagination.total);
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod infinite;
pub mod repository;
pub mod views;

#[cfg(test)]
mod testing;

pub use campus_core;

pub use cache::{CacheConfig, CacheStatus, ListingCache, ListingKey};
pub use client::{CmsClient, FormReceipt};
pub use config::{ClientConfig, CmsEndpoint, ConfigError, ExecutionContext};
pub use error::{CmsError, CmsErrorKind, CmsResult};
pub use infinite::{FetchStatus, InfiniteListing, PageRequest};
pub use repository::{ContentRepository, ContentSource};
pub use views::ViewLatch;
