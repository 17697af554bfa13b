//! Server configuration.

use std::path::PathBuf;

use signvote_engine::{EngineConfig, DEFAULT_MODEL_PATH};

/// Value of `LANDMARK_SOURCE` / `RECORD_OUTPUT` meaning stdin / stdout.
pub const STDIO: &str = "-";

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Labeled feature archive for the learned classifier
    pub model_path: PathBuf,
    /// NDJSON landmark frames, a path or `-`
    pub landmark_source: String,
    /// NDJSON change-driven records, a path or `-`
    pub record_output: String,
    /// Speech program command line; `None` logs feedback only
    pub feedback_command: Option<String>,
    /// Bounded feedback queue capacity
    pub feedback_queue_size: usize,
    /// Expose `/metrics`
    pub metrics_enabled: bool,
    /// Per-frame pipeline tuning
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            landmark_source: STDIO.to_string(),
            record_output: STDIO.to_string(),
            feedback_command: None,
            feedback_queue_size: 16,
            metrics_enabled: true,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or(defaults.cors_origins),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            landmark_source: std::env::var("LANDMARK_SOURCE").unwrap_or(defaults.landmark_source),
            record_output: std::env::var("RECORD_OUTPUT").unwrap_or(defaults.record_output),
            feedback_command: std::env::var("FEEDBACK_COMMAND")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            feedback_queue_size: std::env::var("FEEDBACK_QUEUE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.feedback_queue_size),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            engine: EngineConfig::from_env(),
        }
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
