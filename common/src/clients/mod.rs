pub mod adf;
pub mod jira;
pub mod slack;
