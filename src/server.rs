use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::future::Future;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::{ApiError, Reason, ValidationError};
use crate::service::PredictionService;
use crate::types::PredictionOut;

// ---------- Handler ----------

async fn predict(
    State(svc): State<PredictionService>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionOut>, ApiError> {
    let Json(raw) = payload
        .map_err(|e| ValidationError::new("body", Reason::Malformed, e.body_text()))?;
    Ok(Json(svc.predict(raw).await?))
}

// ---------- Router ----------

/// CORS policy: any origin when `origins` is empty, otherwise exactly those.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let list = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o.trim()).with_context(|| format!("invalid origin {o:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(list)
    };
    Ok(CorsLayer::new()
        .allow_origin(allow)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

pub fn router(svc: PredictionService, cors: CorsLayer) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .layer(cors)
        .with_state(svc)
}

// ---------- Shutdown ----------

/// Resolves on ctrl-c or SIGTERM. Handlers are installed before this returns,
/// so a signal sent right after the call is not lost.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let term = async {
            terminate.recv().await;
        };
        #[cfg(not(unix))]
        let term = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("ctrl-c received"),
            _ = term => tracing::info!("SIGTERM received"),
        }
        tracing::info!("shutdown requested");
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn sigterm_triggers_shutdown() {
        let shutdown = shutdown_signal().unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), shutdown)
            .await
            .expect("shutdown future resolves on SIGTERM");
    }
}
