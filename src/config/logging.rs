//! Logging configuration and telemetry setup

use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

static TELEMETRY_INIT: OnceCell<()> = OnceCell::new();

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "promo_engine=debug,sqlx=warn"
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.level.is_empty() {
            return Err(ValidationError::MissingRequired("LOGGING_LEVEL"));
        }
        self.level
            .parse::<EnvFilter>()
            .map_err(|_| ValidationError::InvalidLogLevel(self.level.clone()))?;
        Ok(())
    }

    /// Install the global tracing subscriber.
    ///
    /// Idempotent: only the first call installs; subsequent calls are no-ops
    /// so embedding processes and tests can both call it safely.
    pub fn init_telemetry(&self) {
        TELEMETRY_INIT.get_or_init(|| {
            let filter = EnvFilter::try_new(&self.level)
                .unwrap_or_else(|_| EnvFilter::new("info"));
            if self.json {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .json()
                    .init();
            } else {
                tracing_subscriber::fmt().with_env_filter(filter).init();
            }
        });
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
