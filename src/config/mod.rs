use std::env;

use crate::monitoring::ClassificationConfig;

/// Distinguishes runtime behavior for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for an embedding application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub classification: ClassificationConfig,
}

impl AppConfig {
    /// Load from the process environment (after sourcing `.env` when
    /// present). Classification knobs fall back to the rulebook defaults.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut classification = ClassificationConfig::default();
        if let Ok(raw) = env::var("CREDITWATCH_SAFE_THRESHOLD") {
            classification.safe_threshold = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidThreshold { value: raw.clone() })?;
        }
        if let Ok(raw) = env::var("CREDITWATCH_MANDATORY_TOLERANCE") {
            classification.mandatory_failure_tolerance = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidTolerance { value: raw.clone() })?;
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            classification,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CREDITWATCH_SAFE_THRESHOLD '{value}' is not a number")]
    InvalidThreshold { value: String },
    #[error("CREDITWATCH_MANDATORY_TOLERANCE '{value}' is not a whole number")]
    InvalidTolerance { value: String },
}
