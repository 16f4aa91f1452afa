use std::sync::Arc;

use common::{
    error::AppError,
    utils::{generation::TextGenerator, prompts::documentation_answer_prompt},
};
use tracing::{debug, instrument};

use crate::{cache::KnowledgeCache, scoring::search, Paragraph};

pub const NOT_FOUND_ANSWER: &str = "Not sure. This wasn't found in the documentation.";

pub const DEFAULT_TOP_N: usize = 5;

/// Joins `"<title>: <content>"` lines for the generation prompt.
pub fn build_context(paragraphs: &[Paragraph]) -> String {
    paragraphs
        .iter()
        .map(|paragraph| format!("{}: {}", paragraph.source_title, paragraph.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Answers free-text questions from the documentation cache.
pub struct AnswerComposer {
    cache: Arc<KnowledgeCache>,
    generator: Arc<dyn TextGenerator>,
    top_n: usize,
}

impl AnswerComposer {
    pub fn new(cache: Arc<KnowledgeCache>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            cache,
            generator,
            top_n: DEFAULT_TOP_N,
        }
    }

    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn cache(&self) -> &Arc<KnowledgeCache> {
        &self.cache
    }

    /// No match yields the fixed not-found text, a single match is returned
    /// verbatim, and several matches are summarised by the generator.
    #[instrument(skip_all, fields(query_bytes = query.len()))]
    pub async fn answer(&self, query: &str) -> Result<String, AppError> {
        self.cache.ensure_populated().await;

        let snapshot = self.cache.snapshot().await;
        let results = search(snapshot.paragraphs(), query, self.top_n);
        debug!(matches = results.len(), "Scored documentation paragraphs");

        match results.as_slice() {
            [] => Ok(NOT_FOUND_ANSWER.to_string()),
            [single] => Ok(single.content.clone()),
            several => {
                let prompt = documentation_answer_prompt(query, &build_context(several));
                let answer = self.generator.generate(&prompt).await?;
                Ok(answer.trim().to_string())
            }
        }
    }
}
