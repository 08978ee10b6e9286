//! Display filter for fetched headlines.
//!
//! The aggregator returns placeholder entries for retracted stories (title
//! `[Removed]`) and plenty of items without artwork. Neither is shown.

use super::types::Article;

/// Title the aggregator substitutes for retracted stories.
pub const REMOVED_SENTINEL: &str = "[Removed]";

/// Whether an article is fit for display.
///
/// Must be evaluated on the title as fetched, before any translation.
pub fn is_displayable(article: &Article) -> bool {
    if article.title == REMOVED_SENTINEL {
        return false;
    }
    matches!(&article.url_to_image, Some(image) if !image.is_empty())
}

/// Drop undisplayable articles, preserving the order of the rest.
pub fn filter_articles(articles: Vec<Article>) -> Vec<Article> {
    let before = articles.len();
    let kept: Vec<Article> = articles.into_iter().filter(is_displayable).collect();

    if kept.len() < before {
        tracing::debug!(
            removed = before - kept.len(),
            kept = kept.len(),
            "Filtered undisplayable articles"
        );
    }

    kept
}
