//! Scripted GitHub backend shared by the enrichment unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::github::api::{GithubApi, ListParams, SearchKind};
use crate::github::client::GithubClient;
use crate::github::RepoRef;
use crate::rate_limiter::{RateLimiter, RateLimiterConfig};

/// Answers every secondary endpoint with fixed payloads; numbers in `fail` error out.
#[derive(Default)]
pub struct ScriptedApi {
  fail: Vec<u64>,
  calls: Arc<AtomicUsize>,
}

impl ScriptedApi {
  pub fn failing(numbers: &[u64]) -> Self {
    Self {
      fail: numbers.to_vec(),
      ..Self::default()
    }
  }

  pub fn calls(&self) -> Arc<AtomicUsize> {
    Arc::clone(&self.calls)
  }

  fn secondary(&self, number: u64, payload: Value) -> Result<Value> {
    self.calls.fetch_add(1, Ordering::SeqCst);

    if self.fail.contains(&number) {
      bail!("scripted failure for #{}", number);
    }

    Ok(payload)
  }
}

#[async_trait]
impl GithubApi for ScriptedApi {
  async fn list_commits(&self, _r: &RepoRef, _p: &ListParams) -> Result<Value> {
    Ok(json!([]))
  }

  async fn list_pull_requests(&self, _r: &RepoRef, _p: &ListParams) -> Result<Value> {
    Ok(json!([]))
  }

  async fn list_issues(&self, _r: &RepoRef, _p: &ListParams) -> Result<Value> {
    Ok(json!([]))
  }

  async fn list_pull_reviews(&self, _r: &RepoRef, n: u64, _c: usize) -> Result<Value> {
    self.secondary(
      n,
      json!([
        { "state": "CHANGES_REQUESTED", "user": { "login": "alice" }, "submitted_at": "2024-06-01T01:00:00Z" },
        { "state": "APPROVED", "user": { "login": "bob" }, "submitted_at": "2024-06-01T03:00:00Z" }
      ]),
    )
  }

  async fn list_pull_files(&self, _r: &RepoRef, n: u64, _c: usize) -> Result<Value> {
    self.secondary(
      n,
      json!([
        { "filename": "src/lib.rs", "status": "modified", "additions": 10, "deletions": 2, "changes": 12 },
        { "filename": "README.md", "status": "modified", "additions": 1, "deletions": 0, "changes": 1 }
      ]),
    )
  }

  async fn list_pull_comments(&self, _r: &RepoRef, n: u64, _c: usize) -> Result<Value> {
    self.secondary(n, json!([{ "body": "nit", "user": { "login": "carol" } }]))
  }

  async fn list_issue_comments(&self, _r: &RepoRef, n: u64, _c: usize) -> Result<Value> {
    self.secondary(
      n,
      json!([
        { "body": "repro?", "user": { "login": "dave" } },
        { "body": "yes", "user": { "login": "erin" } },
        { "body": "fixed", "user": { "login": "dave" } }
      ]),
    )
  }

  async fn search(&self, _k: SearchKind, _q: &str, _p: usize) -> Result<Value> {
    Ok(json!({ "items": [] }))
  }
}

pub fn client(api: ScriptedApi) -> GithubClient {
  GithubClient::new(Arc::new(api), RateLimiter::new(RateLimiterConfig::with_delay_ms(0)))
}
