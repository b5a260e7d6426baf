//! Logging setup using `tracing-subscriber`.
//!
//! Library crates only emit `tracing` events. A binary or test harness calls
//! [`init_tracing`] once to route them somewhere.
//!
//! # Log Levels
//!
//! - `warn`: Listener failures, storage faults, windows kept after a failed fetch
//! - `info`: Catalog lifecycle
//! - `debug`: Mutations, page fetches, view attach and detach

use longhaul_foundation::{Error, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit one JSON object per event.
    pub json: bool,
    /// Include the event target (module path).
    pub with_target: bool,
    /// Use ANSI colors in text output.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
            with_target: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Sets the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enables or disables JSON output.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Enables or disables the event target.
    #[must_use]
    pub fn with_target(mut self, enable: bool) -> Self {
        self.with_target = enable;
        self
    }

    /// Enables or disables ANSI colors.
    #[must_use]
    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// Parses `EnvFilter` directives.
///
/// # Errors
///
/// Returns an invalid configuration error if a directive does not parse.
pub fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::builder()
        .parse(directives)
        .map_err(|err| Error::invalid_config(format!("log filter '{directives}': {err}")))
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over [`LogConfig::filter`]. Returns false if a
/// subscriber was already installed; the existing one is left in place.
///
/// # Errors
///
/// Returns an invalid configuration error if the configured filter does not parse.
pub fn init_tracing(config: &LogConfig) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.filter)?,
    };

    let installed = if config.json {
        let layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(config.with_target);
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.with_ansi)
            .with_target(config.with_target);
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init()
    };
    Ok(installed.is_ok())
}
