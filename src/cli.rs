use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::time::Duration;

use crate::github::{is_valid_login, RepoRef};
use crate::pipeline::{ActivityRequest, ActivityScope, DEFAULT_LIMIT};
use crate::rate_limiter::{RateLimiterConfig, DEFAULT_DELAY_MS};
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "github-activity-digest",
    version,
    about = "Collect GitHub commits, pull requests, and issues into one cross-referenced JSON report",
    long_about = None
)]
pub struct Cli {
  /// Repository: owner/name, a GitHub URL, or a local checkout with a GitHub origin
  #[arg(long, conflicts_with = "user")]
  pub repo: Option<String>,

  /// Cross-repository mode: activity authored by this GitHub user (via search)
  #[arg(long)]
  pub user: Option<String>,

  /// Window start (RFC 3339 or YYYY-MM-DD, inclusive)
  #[arg(long)]
  pub since: Option<String>,

  /// Window end (RFC 3339 or YYYY-MM-DD, inclusive; a bare date covers that whole day)
  #[arg(long)]
  pub until: Option<String>,

  /// Only include items authored by this login
  #[arg(long)]
  pub author: Option<String>,

  /// Branch (or any ref) to list commits from
  #[arg(long)]
  pub branch: Option<String>,

  /// Maximum items per list
  #[arg(long, default_value_t = DEFAULT_LIMIT)]
  pub limit: usize,

  /// Skip pull requests (also disables commit association)
  #[arg(long)]
  pub no_prs: bool,

  #[arg(long)]
  pub no_issues: bool,

  /// Skip secondary detail (reviews, files, comments)
  #[arg(long)]
  pub no_reviews: bool,

  /// Minimum delay between upstream calls, in milliseconds
  #[arg(long, env = "GITHUB_ACTIVITY_DELAY_MS", default_value_t = DEFAULT_DELAY_MS)]
  pub delay_ms: u64,

  /// Give up on a single upstream call after this many seconds (0 = never)
  #[arg(long, default_value_t = 0)]
  pub task_timeout_secs: u64,

  /// Output file (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Log debug diagnostics to stderr
  #[arg(short, long)]
  pub verbose: bool,

  /// Override the "now" instant used for open pull-request windows (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
  #[serde(skip)]
  pub request: ActivityRequest,
  pub scope: String,
  pub delay_ms: u64,
  pub task_timeout_secs: Option<u64>,
  pub out: String,
  pub verbose: bool,
}

impl EffectiveConfig {
  pub fn limiter_config(&self) -> RateLimiterConfig {
    RateLimiterConfig {
      delay: Duration::from_millis(self.delay_ms),
      task_timeout: self.task_timeout_secs.map(Duration::from_secs),
    }
  }
}

fn parse_bound(
  flag: &str,
  value: Option<&str>,
  parse: fn(&str) -> Result<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>> {
  match value {
    None => Ok(None),
    Some(v) => parse(v)
      .map(Some)
      .map_err(|e| anyhow::anyhow!("--{}: {:#}", flag, e)),
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let scope = match (&cli.repo, &cli.user) {
    (Some(r), None) => ActivityScope::Repository(RepoRef::resolve(r)?),
    (None, Some(u)) => {
      let login = u.trim();
      if !is_valid_login(login) {
        bail!("invalid GitHub username {:?}", u);
      }
      ActivityScope::User(login.to_string())
    }
    (None, None) => bail!("Provide one of --repo or --user"),
    (Some(_), Some(_)) => bail!("Choose only one of --repo | --user"),
  };

  let since = parse_bound("since", cli.since.as_deref(), util::parse_instant)?;
  let until = parse_bound("until", cli.until.as_deref(), util::parse_window_end)?;
  let now = parse_bound("now-override", cli.now_override.as_deref(), util::parse_instant)?;

  let request = ActivityRequest {
    since,
    until,
    author: cli.author.filter(|a| !a.trim().is_empty()),
    branch: cli.branch.filter(|b| !b.trim().is_empty()),
    include_pull_requests: !cli.no_prs,
    include_issues: !cli.no_issues,
    include_reviews: !cli.no_reviews,
    limit: cli.limit,
    now,
    ..ActivityRequest::new(scope)
  };
  request.validate()?;

  Ok(EffectiveConfig {
    scope: request.scope.label(),
    request,
    delay_ms: cli.delay_ms,
    task_timeout_secs: (cli.task_timeout_secs > 0).then_some(cli.task_timeout_secs),
    out: cli.out,
    verbose: cli.verbose,
  })
}
