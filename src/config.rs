use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, Parser};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use crate::model::{ConstantEstimator, Estimator, LinearEstimator};

/// Student GPA prediction service.
#[derive(Parser, Debug, Clone)]
#[command(name = "gpa_predictor", version, about)]
pub struct Config {
    /// Address to bind.
    #[arg(long, env = "GPA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Linear model JSON. Without it the constant estimator is used.
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Value returned by the constant estimator.
    #[arg(long, env = "GPA_CONSTANT", default_value_t = 3.21)]
    pub constant: f64,

    #[arg(long, env = "GPA_PREDICT_TIMEOUT_MS", default_value_t = 2000)]
    pub predict_timeout_ms: u64,

    /// Leave the echoed request out of success responses.
    #[arg(long, env = "GPA_NO_ECHO", value_parser = BoolishValueParser::new())]
    pub no_echo: bool,

    /// Allowed CORS origin (repeatable). Any origin when unset.
    #[arg(long = "allowed-origin", env = "GPA_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    pub fn predict_timeout(&self) -> Duration {
        Duration::from_millis(self.predict_timeout_ms)
    }

    pub fn load_estimator(&self) -> Result<Arc<dyn Estimator>> {
        Ok(match &self.model_path {
            Some(path) => Arc::new(LinearEstimator::load(path)?),
            None => {
                anyhow::ensure!(self.constant.is_finite(), "constant must be finite");
                Arc::new(ConstantEstimator(self.constant))
            }
        })
    }
}
