pub mod docs_refresh;
pub mod liveness;
pub mod readiness;
pub mod slack_events;
