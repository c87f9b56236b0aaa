use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Instant};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shrike_engine::{
    config::Config,
    engine::ScoringEngine,
    error::AppError,
    metrics::Metrics,
    types::{ScoreRequest, ScoreResponse},
};

#[derive(Clone)]
struct AppState {
    engine: Arc<ScoringEngine>,
    metrics: Arc<Metrics>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shrike_engine=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("loaded configuration: {:?}", config);

    let bind_addr = config.bind_addr.clone();
    let engine = ScoringEngine::new(config)?;
    let state = AppState {
        engine: Arc::new(engine),
        metrics: Arc::new(Metrics::new()),
    };

    let app = Router::new()
        .route("/score", post(score_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("starting Shrike scoring engine on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn score_handler(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::InvalidInput("url must not be empty".to_string()));
    }

    let start = Instant::now();
    let response = state.engine.score(&request.url);
    state.metrics.observe_request(start.elapsed(), response.verdict);

    Ok(Json(response))
}

async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "trees": state.engine.tree_count(),
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.format()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("shutdown signal received, starting graceful shutdown");
}
