use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use github_activity_digest::enrichment::EnrichmentLimits;
use github_activity_digest::github::api::{GithubApi, ListParams, SearchKind};
use github_activity_digest::github::RepoRef;
use github_activity_digest::{ActivityPipeline, RateLimiter, RateLimiterConfig};

/// In-memory GitHub with canned payloads and call accounting.
pub struct FakeApi {
  pub commits: Value,
  pub pulls: Value,
  pub issues: Value,
  pub reviews: Value,
  pub files: Value,
  pub pr_comments: Value,
  pub issue_comments: Value,
  pub search_commits: Value,
  pub search_issues: Value,
  /// Every primary listing fails.
  pub fail_primary: bool,
  /// Secondary calls for these numbers fail.
  pub fail_numbers: Vec<u64>,
  pub primary_calls: AtomicUsize,
  pub secondary_calls: AtomicUsize,
}

impl Default for FakeApi {
  fn default() -> Self {
    Self {
      commits: json!([]),
      pulls: json!([]),
      issues: json!([]),
      reviews: json!([]),
      files: json!([]),
      pr_comments: json!([]),
      issue_comments: json!([]),
      search_commits: json!({ "items": [] }),
      search_issues: json!({ "items": [] }),
      fail_primary: false,
      fail_numbers: vec![],
      primary_calls: AtomicUsize::new(0),
      secondary_calls: AtomicUsize::new(0),
    }
  }
}

#[allow(dead_code)]
impl FakeApi {
  /// The acme/widgets fixture set: 3 commits, PR #7 (merged) and #8 (open).
  pub fn acme_widgets() -> Self {
    Self {
      commits: test_support::read_fixture_json("acme_widgets/commits.json"),
      pulls: test_support::read_fixture_json("acme_widgets/pulls.json"),
      reviews: test_support::read_fixture_json("acme_widgets/reviews.json"),
      files: test_support::read_fixture_json("acme_widgets/files.json"),
      ..Self::default()
    }
  }

  pub fn total_calls(&self) -> usize {
    self.primary_calls.load(Ordering::SeqCst) + self.secondary_calls.load(Ordering::SeqCst)
  }

  pub fn secondary(&self) -> usize {
    self.secondary_calls.load(Ordering::SeqCst)
  }

  fn primary(&self, payload: &Value) -> Result<Value> {
    self.primary_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_primary {
      bail!("503 Service Unavailable");
    }
    Ok(payload.clone())
  }

  fn detail(&self, number: u64, payload: &Value) -> Result<Value> {
    self.secondary_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_numbers.contains(&number) {
      bail!("502 Bad Gateway for #{}", number);
    }
    Ok(payload.clone())
  }
}

#[async_trait]
impl GithubApi for FakeApi {
  async fn list_commits(&self, _repo: &RepoRef, _params: &ListParams) -> Result<Value> {
    self.primary(&self.commits)
  }

  async fn list_pull_requests(&self, _repo: &RepoRef, _params: &ListParams) -> Result<Value> {
    self.primary(&self.pulls)
  }

  async fn list_issues(&self, _repo: &RepoRef, _params: &ListParams) -> Result<Value> {
    self.primary(&self.issues)
  }

  async fn list_pull_reviews(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    self.detail(number, &self.reviews)
  }

  async fn list_pull_files(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    self.detail(number, &self.files)
  }

  async fn list_pull_comments(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    self.detail(number, &self.pr_comments)
  }

  async fn list_issue_comments(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    self.detail(number, &self.issue_comments)
  }

  async fn search(&self, kind: SearchKind, _query: &str, _per_page: usize) -> Result<Value> {
    match kind {
      SearchKind::Commits => self.primary(&self.search_commits),
      SearchKind::Issues => self.primary(&self.search_issues),
    }
  }
}

/// Pipeline over `api` with no inter-call delay.
#[allow(dead_code)]
pub fn pipeline(api: Arc<FakeApi>) -> ActivityPipeline {
  ActivityPipeline::new(
    api,
    RateLimiter::new(RateLimiterConfig::with_delay_ms(0)),
    EnrichmentLimits::default(),
  )
}
