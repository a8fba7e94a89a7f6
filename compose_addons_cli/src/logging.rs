//! Log subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Environment variable holding an explicit log filter.
pub const LOG_ENV: &str = "COMPOSE_ADDONS_LOG";

/// Default filter directive for the given `-v` count.
#[must_use]
pub const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install a stderr subscriber.
///
/// A filter in [`LOG_ENV`] takes precedence over `verbosity`.
///
/// # Errors
///
/// Returns [`CliError::Logging`] if a global subscriber is already set.
pub fn init(verbosity: u8) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
