use std::sync::Arc;

use common::{
    clients::{jira::JiraClient, slack::SlackClient},
    utils::{config::AppConfig, generation::TextGenerator},
};
use retrieval_pipeline::{AnswerComposer, KnowledgeCache};

use crate::dedup::ProcessedEvents;

#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub slack: Arc<SlackClient>,
    pub jira: Arc<JiraClient>,
    pub generator: Arc<dyn TextGenerator>,
    pub answers: Arc<AnswerComposer>,
    pub processed_events: Arc<ProcessedEvents>,
}

impl ApiState {
    pub fn new(
        config: &AppConfig,
        http: reqwest::Client,
        generator: Arc<dyn TextGenerator>,
        cache: Arc<KnowledgeCache>,
    ) -> Self {
        let answers = AnswerComposer::new(cache, Arc::clone(&generator))
            .with_top_n(config.answer_top_n);

        Self {
            config: config.clone(),
            slack: Arc::new(SlackClient::from_config(config, http.clone())),
            jira: Arc::new(JiraClient::from_config(config, http)),
            generator,
            answers: Arc::new(answers),
            processed_events: Arc::new(ProcessedEvents::new(config.processed_events_capacity)),
        }
    }

    pub fn cache(&self) -> &Arc<KnowledgeCache> {
        self.answers.cache()
    }
}
