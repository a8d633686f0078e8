//! Log output for the CLI.
//!
//! Events go to stderr so they never mix with the verdict on stdout.

use std::io;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise `verbose` picks the level: warnings only by
/// default, `debug` for `-v`, and `trace` (every transition) for `-vv`.
pub fn init(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
