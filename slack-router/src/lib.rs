use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{
    docs_refresh::refresh_docs, liveness::live, readiness::ready, slack_events::slack_events,
};

pub mod api_state;
pub mod commands;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod messages;
mod routes;

#[cfg(test)]
mod test_support;

const SLACK_EVENT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Router for the Slack bot: event intake, probes and cache maintenance.
pub fn api_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Probes for k8s/systemd
    let probes = Router::new()
        .route("/health", get(live))
        .route("/live", get(live))
        .route("/ready", get(ready));

    let bot = Router::new()
        .route(
            "/slack/events",
            post(slack_events).layer(DefaultBodyLimit::max(SLACK_EVENT_MAX_BODY_BYTES)),
        )
        .route("/docs/refresh", post(refresh_docs));

    probes.merge(bot)
}
