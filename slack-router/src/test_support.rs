use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use common::{
    error::AppError,
    utils::{config::AppConfig, generation::TextGenerator},
};
use retrieval_pipeline::{Document, DocumentSource, KnowledgeCache};
use wiremock::MockServer;

use crate::api_state::ApiState;

pub struct StubGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl StubGenerator {
    pub fn new() -> Self {
        Self::replying("A generated summary.")
    }

    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| AppError::Generation("model unavailable".into()))
    }
}

/// Serves a fixed set of pages, or fails every fetch when `None`.
pub struct FixedSource(pub Option<Vec<Document>>);

#[async_trait]
impl DocumentSource for FixedSource {
    async fn fetch_all(&self) -> Result<Vec<Document>, AppError> {
        self.0
            .clone()
            .ok_or_else(|| AppError::Upstream("confluence returned 503".into()))
    }
}

pub fn test_config(slack: &MockServer, jira: &MockServer) -> AppConfig {
    AppConfig {
        slack_bot_token: "xoxb-test".into(),
        slack_api_base: slack.uri(),
        jira_domain: jira.uri(),
        jira_email: "bot@example.com".into(),
        jira_api_token: "jira-token".into(),
        ..Default::default()
    }
}

pub fn pages(pages: Vec<(&str, &str)>) -> Vec<Document> {
    pages
        .into_iter()
        .enumerate()
        .map(|(i, (title, text))| Document::new(i.to_string(), title, text))
        .collect()
}

pub fn state_with_source(
    slack: &MockServer,
    jira: &MockServer,
    generator: Arc<dyn TextGenerator>,
    source: FixedSource,
) -> ApiState {
    ApiState::new(
        &test_config(slack, jira),
        reqwest::Client::new(),
        generator,
        Arc::new(KnowledgeCache::new(Arc::new(source))),
    )
}

pub fn test_state(
    slack: &MockServer,
    jira: &MockServer,
    generator: Arc<dyn TextGenerator>,
    documents: Vec<(&str, &str)>,
) -> ApiState {
    state_with_source(slack, jira, generator, FixedSource(Some(pages(documents))))
}
