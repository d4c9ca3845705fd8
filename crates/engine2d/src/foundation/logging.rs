//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

use crate::core::config::DevConfig;

/// Initialize the logging system
///
/// `RUST_LOG` still wins when set. Without it, `dev.print_logs` selects a
/// `debug` filter and everything else stays at `warn`.
pub fn init(dev: &DevConfig) {
    let default_filter = if dev.print_logs { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);

    // A second init (tests, engine restarts) is harmless
    let _ = env_logger::Builder::from_env(env).try_init();
}
