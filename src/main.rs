use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use github_activity_digest::cli::{normalize, Cli};
use github_activity_digest::enrichment::EnrichmentLimits;
use github_activity_digest::github::api::{build_api, env_wants_fixtures};
use github_activity_digest::github::get_github_token;
use github_activity_digest::logging::init_tracing;
use github_activity_digest::{ActivityPipeline, RateLimiter};

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  // Phase 1: normalize CLI (all input validation happens here, before any request)
  let cfg = normalize(cli)?;
  debug!(config = %serde_json::to_string(&cfg)?, "effective config");

  // Phase 2: wire transport
  let token = if env_wants_fixtures() { None } else { get_github_token() };
  if token.is_none() && !env_wants_fixtures() {
    warn!("no GitHub token found (GITHUB_TOKEN, GH_TOKEN, gh auth token); using unauthenticated requests");
  }
  let limiter = RateLimiter::new(cfg.limiter_config());
  let pipeline = ActivityPipeline::new(build_api(token), limiter, EnrichmentLimits::default());

  // Phase 3: run and emit
  let report = pipeline.run(&cfg.request).await?;
  let json = serde_json::to_string_pretty(&report)?;

  if cfg.out == "-" {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json)?;
  } else {
    std::fs::write(&cfg.out, format!("{}\n", json)).with_context(|| format!("writing {}", cfg.out))?;
    info!(path = %cfg.out, "report written");
  }

  Ok(())
}
