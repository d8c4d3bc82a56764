// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Rate-limited, typed access to the GitHub API for fetchers and enrichment
// role: integration/client
// inputs: Arc<dyn GithubApi>, RateLimiter handle
// outputs: Raw listings (primary fetch) and typed secondary records (reviews, files, comments)
// side_effects: Every upstream call is one RateLimiter::execute; secondary responses memoized per client
// invariants:
// - Cache hits never touch the limiter; only successful responses are cached
// - Concurrent lookups of one key share a single upstream call
// - Secondary lists are truncated to the requested cap
// errors: Upstream errors propagate unchanged to the caller
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use super::api::{GithubApi, ListParams, SearchKind};
use super::convert;
use super::RepoRef;
use crate::model::{Comment, FileChange, Review};
use crate::rate_limiter::RateLimiter;

type ResponseCache = Mutex<HashMap<String, Arc<OnceCell<Value>>>>;

#[derive(Clone)]
pub struct GithubClient {
  api: Arc<dyn GithubApi>,
  limiter: RateLimiter,
  cache: Arc<ResponseCache>,
}

impl std::fmt::Debug for GithubClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GithubClient").field("limiter", &self.limiter).finish_non_exhaustive()
  }
}

impl GithubClient {
  pub fn new(api: Arc<dyn GithubApi>, limiter: RateLimiter) -> Self {
    Self {
      api,
      limiter,
      cache: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  pub fn limiter(&self) -> &RateLimiter {
    &self.limiter
  }

  /// Run one API call through the limiter.
  async fn call<F, Fut>(&self, f: F) -> Result<Value>
  where
    F: FnOnce(Arc<dyn GithubApi>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
  {
    let api = Arc::clone(&self.api);
    self.limiter.execute(move || f(api)).await
  }

  /// Memoized call keyed by `key`. Callers racing on one key wait for the
  /// in-flight call; a failure leaves the slot empty for the next caller.
  async fn cached_call<F, Fut>(&self, key: String, f: F) -> Result<Value>
  where
    F: FnOnce(Arc<dyn GithubApi>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Value>> + Send + 'static,
  {
    let cell = Arc::clone(
      self
        .cache
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(key.clone())
        .or_default(),
    );

    if let Some(v) = cell.get() {
      debug!(key = %key, "github cache hit");
      return Ok(v.clone());
    }

    let v = cell.get_or_try_init(|| self.call(f)).await?;
    Ok(v.clone())
  }

  pub async fn list_commits(&self, repo: &RepoRef, params: &ListParams) -> Result<Value> {
    let (repo, params) = (repo.clone(), params.clone());
    self.call(move |api| async move { api.list_commits(&repo, &params).await }).await
  }

  pub async fn list_pull_requests(&self, repo: &RepoRef, params: &ListParams) -> Result<Value> {
    let (repo, params) = (repo.clone(), params.clone());
    self.call(move |api| async move { api.list_pull_requests(&repo, &params).await }).await
  }

  pub async fn list_issues(&self, repo: &RepoRef, params: &ListParams) -> Result<Value> {
    let (repo, params) = (repo.clone(), params.clone());
    self.call(move |api| async move { api.list_issues(&repo, &params).await }).await
  }

  pub async fn search(&self, kind: SearchKind, query: &str, per_page: usize) -> Result<Value> {
    let query = query.to_string();
    self.call(move |api| async move { api.search(kind, &query, per_page).await }).await
  }

  pub async fn pull_reviews(&self, repo: &RepoRef, number: u64, cap: usize) -> Result<Vec<Review>> {
    let key = format!("reviews:{}#{}:{}", repo, number, cap);
    let repo = repo.clone();
    let v = self
      .cached_call(key, move |api| async move { api.list_pull_reviews(&repo, number, cap).await })
      .await?;

    Ok(convert::result_items(&v).iter().take(cap).map(convert::review_from_json).collect())
  }

  pub async fn pull_files(&self, repo: &RepoRef, number: u64, cap: usize) -> Result<Vec<FileChange>> {
    let key = format!("files:{}#{}:{}", repo, number, cap);
    let repo = repo.clone();
    let v = self
      .cached_call(key, move |api| async move { api.list_pull_files(&repo, number, cap).await })
      .await?;

    Ok(convert::result_items(&v).iter().filter_map(convert::file_from_json).take(cap).collect())
  }

  pub async fn pull_comments(&self, repo: &RepoRef, number: u64, cap: usize) -> Result<Vec<Comment>> {
    let key = format!("pr-comments:{}#{}:{}", repo, number, cap);
    let repo = repo.clone();
    let v = self
      .cached_call(key, move |api| async move { api.list_pull_comments(&repo, number, cap).await })
      .await?;

    Ok(convert::result_items(&v).iter().take(cap).map(convert::comment_from_json).collect())
  }

  pub async fn issue_comments(&self, repo: &RepoRef, number: u64, cap: usize) -> Result<Vec<Comment>> {
    let key = format!("issue-comments:{}#{}:{}", repo, number, cap);
    let repo = repo.clone();
    let v = self
      .cached_call(key, move |api| async move { api.list_issue_comments(&repo, number, cap).await })
      .await?;

    Ok(convert::result_items(&v).iter().take(cap).map(convert::comment_from_json).collect())
  }
}
