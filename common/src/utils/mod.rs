pub mod config;
pub mod generation;
pub mod prompts;
