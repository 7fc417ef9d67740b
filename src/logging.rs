//! Logging setup.
//!
//! Logs go to stderr so stdout stays free for command output. `RUST_LOG`
//! overrides the configured level; HTTP plumbing crates are clamped to `warn`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const NOISY_MODULES: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls"];

pub fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(filter_directives(log_level))
}

pub fn filter_directives(log_level: &str) -> String {
    let mut directives = log_level.to_lowercase();
    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }
    directives
}

/// Install the global subscriber. `log_format` is `json` or anything else for
/// human-readable output; `ansi` only affects the latter. Calling twice is
/// harmless.
pub fn init_logging(log_level: &str, log_format: &str, ansi: bool) {
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));

    if log_format.eq_ignore_ascii_case("json") {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
            .with_target(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }
}
