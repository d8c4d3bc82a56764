// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate fetch -> associate -> enrich -> rollups into one ActivityReport
// role: orchestration/pipeline
// inputs: ActivityRequest; Arc<dyn GithubApi>; RateLimiter handle; EnrichmentLimits
// outputs: ActivityReport
// side_effects: Upstream calls via GithubClient; tracing spans/events
// invariants:
// - Invalid input is rejected before any upstream call
// - Statistics and summary are computed over the full fetched set, after enrichment
// - "now" is resolved once per run and shared by association and the report stamp
// errors: Primary fetch failure aborts the run as "failed to fetch repository data: <cause>"; enrichment never fails the run
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, info_span, Instrument};

use crate::association::associate_commits;
use crate::enrichment::{EnrichmentEngine, EnrichmentLimits};
use crate::fetch::fetch_primary;
use crate::github::api::GithubApi;
use crate::github::client::GithubClient;
use crate::github::{is_valid_login, RepoRef};
use crate::model::{ActivityReport, ReportWindow};
use crate::rate_limiter::RateLimiter;
use crate::stats::{build_summary, compute_statistics};
use crate::util::effective_now;

/// Result cap applied to each primary list when the caller does not choose one.
pub const DEFAULT_LIMIT: usize = 100;

/// Repository name used in rollups for cross-repository items lacking one.
const UNKNOWN_REPOSITORY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityScope {
  Repository(RepoRef),
  /// Cross-repository mode: everything authored by this login, via search.
  User(String),
}

impl ActivityScope {
  pub fn is_cross_repository(&self) -> bool {
    matches!(self, ActivityScope::User(_))
  }

  pub fn repository(&self) -> Option<&RepoRef> {
    match self {
      ActivityScope::Repository(r) => Some(r),
      ActivityScope::User(_) => None,
    }
  }

  pub fn label(&self) -> String {
    match self {
      ActivityScope::Repository(r) => r.slug(),
      ActivityScope::User(login) => format!("user:{}", login),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRequest {
  pub scope: ActivityScope,
  pub since: Option<DateTime<Utc>>,
  pub until: Option<DateTime<Utc>>,
  pub author: Option<String>,
  pub branch: Option<String>,
  pub include_pull_requests: bool,
  pub include_issues: bool,
  pub include_reviews: bool,
  pub limit: usize,
  /// Pinned clock for reproducible runs; wall clock when absent.
  pub now: Option<DateTime<Utc>>,
}

impl ActivityRequest {
  pub fn new(scope: ActivityScope) -> Self {
    Self {
      scope,
      since: None,
      until: None,
      author: None,
      branch: None,
      include_pull_requests: true,
      include_issues: true,
      include_reviews: true,
      limit: DEFAULT_LIMIT,
      now: None,
    }
  }

  pub fn for_repository(repo: RepoRef) -> Self {
    Self::new(ActivityScope::Repository(repo))
  }

  pub fn for_user(login: impl Into<String>) -> Self {
    Self::new(ActivityScope::User(login.into()))
  }

  /// Explicit author filter, or the scoped user in cross-repository mode.
  pub fn author_filter(&self) -> Option<&str> {
    match (&self.author, &self.scope) {
      (Some(a), _) => Some(a.as_str()),
      (None, ActivityScope::User(login)) => Some(login.as_str()),
      (None, ActivityScope::Repository(_)) => None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if let ActivityScope::User(login) = &self.scope {
      if login.trim().is_empty() {
        bail!("a username is required for cross-repository activity");
      }
      if !is_valid_login(login) {
        bail!("invalid GitHub username {:?}", login);
      }
      if let Some(author) = &self.author {
        if !author.eq_ignore_ascii_case(login) {
          bail!("author {:?} conflicts with user {:?}", author, login);
        }
      }
    }

    if let (Some(s), Some(u)) = (self.since, self.until) {
      if s > u {
        bail!("since ({}) is after until ({})", s, u);
      }
    }

    if self.limit == 0 {
      bail!("limit must be at least 1");
    }

    Ok(())
  }
}

pub struct ActivityPipeline {
  client: GithubClient,
  limits: EnrichmentLimits,
}

impl ActivityPipeline {
  pub fn new(api: Arc<dyn GithubApi>, limiter: RateLimiter, limits: EnrichmentLimits) -> Self {
    Self {
      client: GithubClient::new(api, limiter),
      limits,
    }
  }

  pub fn client(&self) -> &GithubClient {
    &self.client
  }

  pub async fn run(&self, request: &ActivityRequest) -> Result<ActivityReport> {
    request.validate()?;

    let scope = request.scope.label();
    let span = info_span!("activity", scope = %scope);

    async move {
      let now = effective_now(request.now);

      let primary = fetch_primary(&self.client, request)
        .await
        .context("failed to fetch repository data")?;

      let commits = associate_commits(primary.commits, &primary.pull_requests, now);
      let associated = commits.iter().filter(|c| c.pull_request.is_some()).count();
      info!(associated, total = commits.len(), "commits associated with pull requests");

      let (commits, pull_requests, issues) = if request.include_reviews {
        let bounds = self.limits.bounds(request.scope.is_cross_repository());
        let engine = EnrichmentEngine::new(&self.client, self.limits, request.scope.repository().cloned());

        tokio::join!(
          engine.enrich_commits(commits, bounds.commits),
          engine.enrich_pull_requests(primary.pull_requests, bounds.pull_requests),
          engine.enrich_issues(primary.issues, bounds.issues),
        )
      } else {
        (commits, primary.pull_requests, primary.issues)
      };

      let fallback = request
        .scope
        .repository()
        .map(RepoRef::slug)
        .unwrap_or_else(|| UNKNOWN_REPOSITORY.to_string());
      let statistics = compute_statistics(&commits, &pull_requests, &issues);
      let summary = build_summary(&commits, &pull_requests, &issues, &fallback);

      Ok(ActivityReport {
        scope,
        window: ReportWindow {
          since: request.since,
          until: request.until,
        },
        generated_at: now,
        commits,
        pull_requests,
        issues,
        statistics,
        summary,
      })
    }
    .instrument(span)
    .await
  }
}
