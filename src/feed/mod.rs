//! Headline retrieval and display filtering.
//!
//! - [`fetcher`] - HTTP client for the headline aggregator
//! - [`filter`] - drops retracted and image-less entries
//! - [`types`] - `Article` and `Category`

mod fetcher;
mod filter;
mod types;

pub use fetcher::{FetchError, NewsFetcher, DEFAULT_PAGE_SIZE};
pub use filter::{filter_articles, is_displayable, REMOVED_SENTINEL};
pub use types::{Article, Category, Field};
