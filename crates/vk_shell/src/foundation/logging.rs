//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system with a configured default level.
///
/// `RUST_LOG` takes precedence over the configured default, so a debug
/// session can raise verbosity without touching the config file.
pub fn init(default_level: &str) {
    let level = default_level
        .parse()
        .unwrap_or(log::LevelFilter::Info);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.init();
}
