#![deny(unused_crate_dependencies)]

//! Logging setup for the deployment tools.
//!
//! Thin wrapper around `tracing` that picks the output format and optionally
//! hooks up sentry. The macros behave just like `tracing::info`, `tracing::warn`, etc.
//!
//! All log output goes to `stderr`: `stdout` is reserved for the results the
//! tools print (e.g. a deployed contract address).
//!
//! The format is `plain` or `json` and is set by the `DEPLOYER_LOG_FORMAT` env variable.
//! Verbosity is controlled with `RUST_LOG`.
//!
//! Full documentation for the `tracing` crate here <https://docs.rs/tracing/>
//!
//! Integration with sentry for catching errors and react on them immediately
//! <https://docs.sentry.io/platforms/rust/>

use std::{backtrace::Backtrace, borrow::Cow, str::FromStr};

use sentry::{types::Dsn, ClientInitGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use chrono as __chrono;
pub use sentry as __sentry;
pub use tracing as __tracing;
pub use tracing::{debug, error, info, trace, warn};

const LOG_FORMAT: &str = "DEPLOYER_LOG_FORMAT";
const SENTRY_URL: &str = "DEPLOYER_SENTRY_URL";
const NETWORK: &str = "DEPLOYER_NETWORK";

/// Output format of the log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Plain,
    /// One JSON object per record, with file and line attached.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(format!("{LOG_FORMAT} has an unexpected value {other}")),
        }
    }
}

fn parse_sentry_url(url: Option<String>) -> Option<Dsn> {
    url.and_then(|url| Dsn::from_str(url.as_str()).ok())
}

/// Initialize logging with tracing and set up log format
///
/// If the sentry URL is provided via an environment variable, this function will also initialize sentry.
/// Returns a sentry client guard which has to be kept alive for events to be delivered.
/// The full description can be found in the official documentation:
/// <https://docs.sentry.io/platforms/rust/#configure>
#[must_use]
pub fn init() -> Option<ClientInitGuard> {
    let log_format = match std::env::var(LOG_FORMAT) {
        Ok(format) => format.parse::<LogFormat>().unwrap_or_else(|e| panic!("{e}")),
        Err(_) => LogFormat::default(),
    };

    match log_format {
        LogFormat::Plain => {
            tracing_subscriber::registry()
                .with(fmt::Layer::default().with_writer(std::io::stderr))
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
        LogFormat::Json => {
            let timer = tracing_subscriber::fmt::time::UtcTime::rfc_3339();
            // must be set before sentry hook for sentry to function
            install_pretty_panic_hook();

            tracing_subscriber::registry()
                .with(
                    fmt::Layer::default()
                        .with_writer(std::io::stderr)
                        .with_file(true)
                        .with_line_number(true)
                        .with_timer(timer)
                        .json(),
                )
                .with(tracing_subscriber::EnvFilter::from_default_env())
                .init();
        }
    };

    parse_sentry_url(std::env::var(SENTRY_URL).ok()).map(|sentry_url| {
        let options = sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var(NETWORK).ok().map(Cow::from),
            attach_stacktrace: true,
            ..Default::default()
        };

        sentry::init((sentry_url, options))
    })
}

/// Format panics like tracing::error
fn install_pretty_panic_hook() {
    // Replaces the default hook instead of chaining to it, otherwise every
    // panic is logged twice.
    std::panic::set_hook(Box::new(move |panic_info| {
        let backtrace = Backtrace::capture();
        let timestamp = chrono::Utc::now();
        let panic_message = if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.as_str()
        } else if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s
        } else {
            "Panic occurred without additional info"
        };

        let panic_location = panic_info
            .location()
            .map(|val| val.to_string())
            .unwrap_or_else(|| "Unknown location".to_owned());

        eprintln!(
            "{}",
            serde_json::json!({
                "timestamp": timestamp.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string(),
                "level": "CRITICAL",
                "fields": {
                    "message": panic_message,
                    "location": panic_location,
                    "backtrace": backtrace.to_string(),
                }
            })
        );
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parsing() {
        assert_eq!("plain".parse::<LogFormat>(), Ok(LogFormat::Plain));
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("JSON".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default(), LogFormat::Plain);
    }

    #[test]
    fn invalid_sentry_url_is_ignored() {
        assert!(parse_sentry_url(None).is_none());
        assert!(parse_sentry_url(Some("not a dsn".to_owned())).is_none());
        assert!(parse_sentry_url(Some("https://public@sentry.example.com/1".to_owned())).is_some());
    }
}
