//! Log subscriber installation

use crate::config::{CliConfig, LogFormat, Verbosity};
use crate::error::{CliError, CliResult};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the event filter: a `RUST_LOG`-style directive wins over the verbosity level
///
/// # Errors
///
/// Returns error if `env_directive` is not a valid filter
pub fn build_filter(verbosity: Verbosity, env_directive: Option<&str>) -> CliResult<EnvFilter> {
    match env_directive.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| CliError::config(format!("invalid RUST_LOG '{directive}': {e}"))),
        None => Ok(EnvFilter::new(verbosity.filter_directive())),
    }
}

/// Install the global subscriber writing to stderr
///
/// # Errors
///
/// Returns error if `RUST_LOG` is malformed or a subscriber is already installed
pub fn init_logging(config: &CliConfig) -> CliResult<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config.verbosity, env.as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(config.color.should_color())
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.map_err(|e| CliError::config(format!("cannot install log subscriber: {e}")))
}
