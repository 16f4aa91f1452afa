use config::ConfigError;
use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("Jira responded with {status}: {body}")]
    Jira { status: u16, body: String },
    #[error("Slack API error: {0}")]
    Slack(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
