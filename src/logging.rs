//! tracing setup. Logs go to stderr; stdout carries only the summary.

use tracing_subscriber::EnvFilter;

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// `filter` (VERIFY_LOG) wins, then RUST_LOG, then the `-v` count.
pub fn init(verbose: u8, filter: Option<&str>) {
    let env_filter = match filter {
        Some(f) => EnvFilter::try_new(f).unwrap_or_else(|_| EnvFilter::new(level_for(verbose))),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose))),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
