use axum::{extract::FromRef, Router};
use common::utils::{
    config::get_config,
    generation::{OpenAiCompatibleGenerator, TextGenerator},
};
use retrieval_pipeline::{ConfluenceFetcher, KnowledgeCache};
use slack_router::{api_routes, api_state::ApiState};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local development keeps credentials in .env
    dotenvy::dotenv().ok();

    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get and validate config
    let config = get_config()?;

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;

    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiCompatibleGenerator::from_config(
        &config,
        http.clone(),
    ));
    let cache = Arc::new(KnowledgeCache::new(Arc::new(
        ConfluenceFetcher::from_config(&config, http.clone()),
    )));

    let api_state = ApiState::new(&config, http, generator, Arc::clone(&cache));

    // Warm the cache; questions retry lazily if Confluence is down right now.
    match cache.refresh().await {
        Ok(summary) => info!(
            documents = summary.documents,
            paragraphs = summary.paragraphs,
            "Documentation cache warmed"
        ),
        Err(e) => warn!(error = %e, "Starting with an empty documentation cache"),
    }

    if let Some(secs) = config.docs_refresh_interval_secs.filter(|secs| *secs > 0) {
        info!(interval_secs = secs, "Scheduling periodic documentation refresh");
        spawn_periodic_refresh(Arc::clone(&cache), Duration::from_secs(secs));
    }

    let app = build_app(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

#[derive(Clone, FromRef)]
struct AppState {
    api_state: ApiState,
}

fn build_app(api_state: ApiState) -> Router {
    Router::new()
        .merge(api_routes())
        .with_state(AppState { api_state })
}

fn spawn_periodic_refresh(cache: Arc<KnowledgeCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately and startup already refreshed.
        interval.tick().await;

        loop {
            interval.tick().await;
            if let Err(e) = cache.refresh().await {
                warn!(error = %e, "Periodic documentation refresh failed");
            }
        }
    })
}
