use clap::Parser;
use tracing_subscriber::EnvFilter;

use gpa_predictor::{config::Config, model, server, PredictionService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gpa_predictor=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = Config::parse();
    let estimator = cfg.load_estimator()?;
    let svc = PredictionService::new(estimator, cfg.predict_timeout(), !cfg.no_echo);

    // Warmup so a broken model fails at startup, not on the first request
    let gpa = svc.estimate(model::warmup_features()).await?;
    tracing::info!(estimator = svc.estimator_name(), warmup_gpa = gpa, "warmup ok");

    if cfg.allowed_origins.is_empty() {
        tracing::warn!("CORS allows any origin; pass --allowed-origin in production");
    }
    if !cfg.no_echo {
        tracing::warn!("responses echo the request body; pass --no-echo in production");
    }

    let app = server::router(svc, server::cors_layer(&cfg.allowed_origins)?);

    let addr = cfg.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal()?)
        .await?;
    tracing::info!("server stopped");
    Ok(())
}
