pub mod answer_retrieval;
pub mod cache;
pub mod fetcher;
pub mod indexer;
pub mod scoring;

#[cfg(test)]
mod test_support;

pub use answer_retrieval::{AnswerComposer, NOT_FOUND_ANSWER};
pub use cache::{CacheSnapshot, KnowledgeCache, RefreshSummary};
pub use fetcher::{ConfluenceFetcher, DocumentSource};
pub use scoring::{search, ScoredParagraph};

/// One documentation page, reduced to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// A single non-empty line of a document, tagged with the page title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub source_title: String,
    pub content: String,
}

impl Paragraph {
    pub fn new(source_title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_title: source_title.into(),
            content: content.into(),
        }
    }
}
