#![deny(clippy::all)]
// use log crate
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use lootsim_config::logging::LoggingConfig;
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

pub mod batch;
pub mod bounded;
pub mod registry;

/// Builds the terminal logger described by `config`, or `None` when logging is off.
///
/// `RUST_LOG` overrides the configured level. Everything goes to stderr so that stdout only
/// carries results.
pub fn logger(config: &LoggingConfig) -> Option<(Box<TermLogger>, LevelFilter)> {
    if !config.enabled {
        return None;
    }
    let mut builder = ConfigBuilder::new();
    if config.timestamp {
        builder.set_time_level(LevelFilter::Error);
        builder.set_time_format_rfc3339();
    } else {
        builder.set_time_level(LevelFilter::Off);
    }
    if config.threads {
        builder.set_thread_level(LevelFilter::Error);
    } else {
        builder.set_thread_level(LevelFilter::Off);
    }
    builder.set_target_level(LevelFilter::Off);

    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(config.level);
    let color = if config.color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    Some((
        TermLogger::new(level, builder.build(), TerminalMode::Stderr, color),
        level,
    ))
}

/// Installs the logger for `$config`, a [`LoggingConfig`]. Fails if a logger is already set.
#[macro_export]
macro_rules! init_log {
    ($config:expr) => {
        match $crate::logger(&$config) {
            Some((logger, level)) => ::log::set_boxed_logger(logger)
                .map(|()| ::log::set_max_level(level)),
            None => Ok(()),
        }
    };
}
