use super::{Language, TranslateClient};
use crate::feed::{Article, Field};
use futures::stream::{self, StreamExt};

/// Default number of field translations in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Translates the text fields of a batch of articles.
///
/// Every non-empty title, description and content field is an independent
/// request. A failed request leaves that one field in its original text.
#[derive(Debug, Clone)]
pub struct TranslationPipeline {
    client: TranslateClient,
    concurrency: usize,
}

impl TranslationPipeline {
    pub fn new(client: TranslateClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Translate `articles` into the language identified by `target`.
    ///
    /// Returns a list of the same length and order. The default language is
    /// the identity; an unsupported code returns the input unchanged. Resolves
    /// only once every field request has settled.
    pub async fn translate(&self, articles: Vec<Article>, target: &str) -> Vec<Article> {
        let Some(language) = Language::from_code(target) else {
            tracing::warn!(code = target, "Unsupported translation language, leaving articles as is");
            return articles;
        };
        if language.is_default() || articles.is_empty() {
            return articles;
        }
        if !self.client.has_key() {
            tracing::warn!(
                language = %language,
                "No translation API key configured, showing original text"
            );
            return articles;
        }

        // Only non-empty fields become requests, tagged with their slot so
        // results can land back in place whatever order they finish in.
        let jobs: Vec<(usize, Field, String)> = articles
            .iter()
            .enumerate()
            .flat_map(|(idx, article)| {
                Field::ALL.into_iter().filter_map(move |field| {
                    article
                        .field(field)
                        .filter(|t| !t.trim().is_empty())
                        .map(|text| (idx, field, text.to_owned()))
                })
            })
            .collect();
        let total = jobs.len();

        let outcomes: Vec<(usize, Field, Option<String>)> = stream::iter(jobs)
            .map(|(idx, field, text)| {
                let client = self.client.clone();
                async move {
                    match client.translate_text(&text, language).await {
                        Ok(translated) => (idx, field, Some(translated)),
                        Err(e) => {
                            tracing::debug!(field = field.name(), error = %e, "Field translation failed");
                            (idx, field, None)
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut translated = articles;
        let mut failed = 0usize;
        for (idx, field, outcome) in outcomes {
            match outcome {
                Some(text) => translated[idx] = translated[idx].with_field(field, text),
                None => failed += 1,
            }
        }
        if failed > 0 {
            tracing::warn!(
                language = %language,
                failed,
                total,
                "Some fields could not be translated, kept original text"
            );
        }

        translated
    }
}
