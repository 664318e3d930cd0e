//! Log setup for the CLI.
//!
//! Logs go to stderr so JSON on stdout stays machine-readable. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init(verbose: bool) {
    let default = if verbose {
        "focusloop_cli=debug,focusloop_core=debug"
    } else {
        "focusloop_cli=warn,focusloop_core=warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
