use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::error::AppError;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub slack_bot_token: String,
    #[serde(default = "default_slack_api_base")]
    pub slack_api_base: String,
    pub jira_domain: String,
    pub jira_email: String,
    pub jira_api_token: String,
    pub confluence_url: String,
    pub confluence_user: String,
    pub confluence_api_token: String,
    pub space_key: String,
    pub gemini_api_key: String,
    #[serde(default = "default_generation_base_url")]
    pub generation_base_url: String,
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_confluence_page_size")]
    pub confluence_page_size: usize,
    #[serde(default = "default_answer_top_n")]
    pub answer_top_n: usize,
    #[serde(default)]
    pub docs_refresh_interval_secs: Option<u64>,
    #[serde(default = "default_processed_events_capacity")]
    pub processed_events_capacity: usize,
    #[serde(default = "default_time_spent")]
    pub default_time_spent: String,
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

/// Gemini exposes an OpenAI compatible chat completions endpoint.
fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_generation_model() -> String {
    "gemini-2.0-flash".to_string()
}

const fn default_http_port() -> u16 {
    8000
}

const fn default_http_timeout_secs() -> u64 {
    30
}

const fn default_confluence_page_size() -> usize {
    50
}

const fn default_answer_top_n() -> usize {
    5
}

const fn default_processed_events_capacity() -> usize {
    10_000
}

fn default_time_spent() -> String {
    "30m".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            slack_bot_token: String::new(),
            slack_api_base: default_slack_api_base(),
            jira_domain: String::new(),
            jira_email: String::new(),
            jira_api_token: String::new(),
            confluence_url: String::new(),
            confluence_user: String::new(),
            confluence_api_token: String::new(),
            space_key: String::new(),
            gemini_api_key: String::new(),
            generation_base_url: default_generation_base_url(),
            generation_model: default_generation_model(),
            http_port: default_http_port(),
            http_timeout_secs: default_http_timeout_secs(),
            confluence_page_size: default_confluence_page_size(),
            answer_top_n: default_answer_top_n(),
            docs_refresh_interval_secs: None,
            processed_events_capacity: default_processed_events_capacity(),
            default_time_spent: default_time_spent(),
        }
    }
}

impl AppConfig {
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Rejects configurations the service cannot run with: missing
    /// credentials, zero sizes and unparsable base URLs.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("SLACK_BOT_TOKEN", &self.slack_bot_token),
            ("JIRA_DOMAIN", &self.jira_domain),
            ("JIRA_EMAIL", &self.jira_email),
            ("JIRA_API_TOKEN", &self.jira_api_token),
            ("CONFLUENCE_URL", &self.confluence_url),
            ("CONFLUENCE_USER", &self.confluence_user),
            ("CONFLUENCE_API_TOKEN", &self.confluence_api_token),
            ("SPACE_KEY", &self.space_key),
            ("GEMINI_API_KEY", &self.gemini_api_key),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        for (name, value) in [
            ("JIRA_DOMAIN", &self.jira_domain),
            ("CONFLUENCE_URL", &self.confluence_url),
            ("SLACK_API_BASE", &self.slack_api_base),
            ("GENERATION_BASE_URL", &self.generation_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| AppError::Validation(format!("{name} is not a valid URL: {e}")))?;
        }

        if self.confluence_page_size == 0 {
            return Err(AppError::Validation(
                "CONFLUENCE_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }

        if self.answer_top_n == 0 {
            return Err(AppError::Validation(
                "ANSWER_TOP_N must be greater than zero".to_string(),
            ));
        }

        if self.processed_events_capacity == 0 {
            return Err(AppError::Validation(
                "PROCESSED_EVENTS_CAPACITY must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Loads the optional `config` file overlaid with environment variables and
/// validates the result.
pub fn get_config() -> Result<AppConfig, AppError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    from_source(config)
}

fn from_source(config: Config) -> Result<AppConfig, AppError> {
    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}
