// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Bounded, failure-isolated secondary detail for the leading items of each fetched list
// role: enrichment/engine
// inputs: Associated commits, pull requests, issues; EnrichmentLimits; GithubClient
// outputs: The same lists, in the same order, with `enrichment` set on successfully enriched leading items
// side_effects: Secondary GitHub calls through the client's rate limiter
// invariants:
// - Only the first `bound` items of a list are attempted; the tail passes through untouched
// - A failed item is emitted un-enriched, logged at warn, and the batch continues (no abort, no retry)
// - Fields of one item are fetched concurrently; items are processed one after another
// errors: Never surfaced; enrichment only degrades fidelity
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod commits;
pub mod issues;
pub mod pull_requests;

#[cfg(test)]
pub(crate) mod test_api;

use std::future::Future;

use anyhow::Result;
use tracing::{debug, warn};

use crate::github::client::GithubClient;
use crate::github::RepoRef;
use crate::model::{EnrichedCommit, Issue, PullRequest};

/// How many items get detail and how much detail each gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentLimits {
  pub commits: usize,
  pub pull_requests: usize,
  pub issues: usize,
  /// Bound applied to every list in cross-repository (search) mode.
  pub search_items: usize,
  pub reviews_per_item: usize,
  pub files_per_item: usize,
  pub comments_per_item: usize,
}

impl Default for EnrichmentLimits {
  fn default() -> Self {
    Self {
      commits: 20,
      pull_requests: 10,
      issues: 10,
      search_items: 5,
      reviews_per_item: 20,
      files_per_item: 50,
      comments_per_item: 20,
    }
  }
}

/// Per-kind bounds resolved for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
  pub commits: usize,
  pub pull_requests: usize,
  pub issues: usize,
}

impl EnrichmentLimits {
  pub fn bounds(&self, cross_repository: bool) -> Bounds {
    if cross_repository {
      Bounds {
        commits: self.search_items,
        pull_requests: self.search_items,
        issues: self.search_items,
      }
    } else {
      Bounds {
        commits: self.commits,
        pull_requests: self.pull_requests,
        issues: self.issues,
      }
    }
  }
}

pub struct EnrichmentEngine<'a> {
  client: &'a GithubClient,
  limits: EnrichmentLimits,
  /// Repository used for items that do not name their own.
  default_repo: Option<RepoRef>,
}

impl<'a> EnrichmentEngine<'a> {
  pub fn new(client: &'a GithubClient, limits: EnrichmentLimits, default_repo: Option<RepoRef>) -> Self {
    Self {
      client,
      limits,
      default_repo,
    }
  }

  pub fn limits(&self) -> &EnrichmentLimits {
    &self.limits
  }

  /// The item's own repository when it names one, else the run's repository.
  fn repo_for(&self, item_repo: Option<&str>) -> Option<RepoRef> {
    item_repo
      .and_then(|slug| RepoRef::parse(slug).ok())
      .or_else(|| self.default_repo.clone())
  }

  pub async fn enrich_commits(&self, commits: Vec<EnrichedCommit>, bound: usize) -> Vec<EnrichedCommit> {
    enrich_leading(commits, bound, "commit", |c| self.enrich_commit(c.clone())).await
  }

  pub async fn enrich_pull_requests(&self, pull_requests: Vec<PullRequest>, bound: usize) -> Vec<PullRequest> {
    enrich_leading(pull_requests, bound, "pull_request", |pr| self.enrich_pull_request(pr.clone())).await
  }

  pub async fn enrich_issues(&self, issues: Vec<Issue>, bound: usize) -> Vec<Issue> {
    enrich_leading(issues, bound, "issue", |issue| self.enrich_issue(issue.clone())).await
  }
}

/// Something the engine can name in diagnostics.
pub trait Describe {
  fn describe(&self) -> String;
}

impl Describe for EnrichedCommit {
  fn describe(&self) -> String {
    self.commit.short_sha().to_string()
  }
}

impl Describe for PullRequest {
  fn describe(&self) -> String {
    format!("#{}", self.number)
  }
}

impl Describe for Issue {
  fn describe(&self) -> String {
    format!("#{}", self.number)
  }
}

/// Apply `enrich` to the first `bound` items, keeping the original on failure.
pub async fn enrich_leading<T, F, Fut>(items: Vec<T>, bound: usize, kind: &'static str, mut enrich: F) -> Vec<T>
where
  T: Describe,
  F: FnMut(&T) -> Fut,
  Fut: Future<Output = Result<T>>,
{
  let total = items.len();
  let mut out = Vec::with_capacity(total);
  let mut failed = 0usize;

  for (index, item) in items.into_iter().enumerate() {
    if index >= bound {
      out.push(item);
      continue;
    }

    match enrich(&item).await {
      Ok(enriched) => out.push(enriched),
      Err(err) => {
        failed += 1;
        warn!(
          kind,
          item = %item.describe(),
          error = %format!("{:#}", err),
          "enrichment failed; keeping item without detail"
        );
        out.push(item);
      }
    }
  }

  debug!(kind, total, attempted = bound.min(total), failed, "enrichment pass finished");
  out
}
