//! Tracing subscriber setup for the `scan` binary.
//!
//! Output goes to stderr; stdout belongs to the console sink.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &[&str] = &["photo_scan=info", "scan_scale=info"];
const VERBOSE_DIRECTIVES: &[&str] = &["photo_scan=debug", "scan_scale=debug", "reqwest=info"];

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> String {
    let directives = if verbose {
        VERBOSE_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    };
    directives.join(",")
}

/// Install the global fmt subscriber. `RUST_LOG` overrides the defaults.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}
