//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Choose pretty or JSON output
//! - Apply the configured level unless `RUST_LOG` overrides it
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Dependencies log at `warn` unless `RUST_LOG` says otherwise

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log level: {0}")]
    Filter(#[from] ParseError),

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Filter directives for a configured level.
fn directives(level: &str) -> String {
    format!("warn,forward_gateway={level},tower_http={level}")
}

fn filter_for(level: &str) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_new(directives(level))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_for(&config.log_level)?,
    };

    let (json, pretty) = match config.log_format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_current_span(true).with_target(false)),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(false))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()?;

    Ok(())
}
