//! Client-side translation of article text.

mod client;
mod language;
mod pipeline;

pub use client::{TranslateClient, TranslateError};
pub use language::Language;
pub use pipeline::{TranslationPipeline, DEFAULT_CONCURRENCY};
