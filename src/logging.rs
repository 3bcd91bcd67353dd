//! Job log output
//!
//! Errors and warnings become workflow commands so the runner annotates the
//! job; debug records carry a timestamp and only show with the `debug` input
//! or a `RUST_LOG` filter.

use chrono::{SecondsFormat, Utc};
use log::{Level, LevelFilter};
use std::io::Write;

use crate::actions::error_command;

/// Install the logger; later calls are ignored
pub fn init(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let message = record.args().to_string();
            match record.level() {
                Level::Error => writeln!(buf, "{}", error_command(&message)),
                Level::Warn => writeln!(buf, "::warning::{}", message),
                Level::Info => writeln!(buf, "{}", message),
                Level::Debug | Level::Trace => writeln!(
                    buf,
                    "{} {}",
                    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    message
                ),
            }
        });

    let _ = builder.try_init();
}
