use crate::config::Config;
use crate::feed::{filter_articles, Article, Category, FetchError, NewsFetcher};
use crate::translate::{Language, TranslateClient, TranslationPipeline};

/// One fetch cycle: retrieve, filter, then translate.
///
/// The filter runs on the titles as fetched, so a translated `[Removed]`
/// placeholder can never slip through.
#[derive(Debug, Clone)]
pub struct FeedCycle {
    fetcher: NewsFetcher,
    translator: TranslationPipeline,
    page_size: u32,
}

impl FeedCycle {
    pub fn new(fetcher: NewsFetcher, translator: TranslationPipeline, page_size: u32) -> Self {
        Self {
            fetcher,
            translator,
            page_size,
        }
    }

    /// Wire a cycle from configuration, sharing one HTTP client.
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        let translate = TranslateClient::new(
            client.clone(),
            &config.translate_base_url,
            config.translate_key(),
        );
        Self::new(
            NewsFetcher::new(client, &config.headlines_base_url),
            TranslationPipeline::new(translate, config.translation_concurrency),
            config.page_size,
        )
    }

    pub async fn run(
        &self,
        category: Category,
        language: Language,
    ) -> Result<Vec<Article>, FetchError> {
        let raw = self.fetcher.fetch_page(category, 1, self.page_size).await?;
        let displayable = filter_articles(raw);

        if language.is_default() {
            return Ok(displayable);
        }
        Ok(self.translator.translate(displayable, language.code()).await)
    }
}
