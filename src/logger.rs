//! Initialize the global `tracing` subscriber from the [`Logger`] settings.
//!
//! Logs go to stderr so that nothing interleaves with output written to
//! stdout by the CLI.

use tracing_subscriber::EnvFilter;

use crate::config::{Format, Logger};
use crate::{Error, Result};

const MODULE_WHITELIST: &[&str] = &["ontofetch"];

/// Builds the filter directive for `config`.
///
/// `override_filter` wins, then `RUST_LOG`, then the configured level applied
/// to this crate with other crates held at `warn`.
#[must_use]
pub fn filter_directive(config: &Logger) -> String {
    if let Some(filter) = &config.override_filter {
        return filter.clone();
    }
    if let Ok(filter) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !filter.trim().is_empty() {
            return filter;
        }
    }
    std::iter::once("warn".to_owned())
        .chain(
            MODULE_WHITELIST
                .iter()
                .map(|module| format!("{module}={}", config.level)),
        )
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the global subscriber. A disabled logger installs nothing.
///
/// # Errors
/// When the filter directive is invalid or a global subscriber is already
/// installed.
pub fn init(config: &Logger) -> Result<()> {
    if !config.enable {
        return Ok(());
    }

    let filter = EnvFilter::try_new(filter_directive(config))
        .map_err(|err| Error::Config(format!("invalid log filter: {err}")))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        Format::Compact => builder.compact().try_init(),
        Format::Pretty => builder.pretty().try_init(),
        Format::Json => builder.json().try_init(),
    };
    installed.map_err(|err| Error::Config(format!("can not install logger: {err}")))
}
