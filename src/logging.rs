// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Install the process-wide tracing subscriber
// role: ambient/logging
// inputs: RUST_LOG (optional), --verbose
// side_effects: Sets the global subscriber; writes to stderr so stdout carries only the report
// invariants: Safe to call more than once (later calls are no-ops)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "warn,github_activity_digest=info";
pub const VERBOSE_FILTER: &str = "warn,github_activity_digest=debug";

/// `RUST_LOG` wins when set; otherwise the default (or verbose) directive.
pub fn env_filter(verbose: bool) -> EnvFilter {
  EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }))
}

pub fn init_tracing(verbose: bool) {
  let _ = tracing_subscriber::registry()
    .with(env_filter(verbose))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
    .try_init();
}
