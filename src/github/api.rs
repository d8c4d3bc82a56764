// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Trait seam over the GitHub REST endpoints the pipeline reads, plus HTTP and fixture backends
// role: integration/github-api
// inputs: RepoRef, ListParams, search queries; token; env GITHUB_API_URL; env GHA_TEST_*_JSON fixtures
// outputs: Raw JSON values (mapping to the model lives in github::convert)
// side_effects: Network calls to the GitHub API (HTTP backend only), run on the blocking thread pool
// invariants:
// - One trait method per consumed endpoint; no method retries or paginates
// - Fixture backend is selected whenever any GHA_TEST_*_JSON variable is present
// errors: HTTP status, transport, and decode failures are returned with the request URL as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::RepoRef;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "github-activity-digest";

/// The GitHub API caps `per_page` at 100.
pub const MAX_PER_PAGE: usize = 100;

/// Query knobs for the primary listings. Each endpoint uses the subset it supports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
  pub since: Option<DateTime<Utc>>,
  pub until: Option<DateTime<Utc>>,
  pub author: Option<String>,
  pub branch: Option<String>,
  pub per_page: usize,
}

impl ListParams {
  pub fn page_size(&self) -> usize {
    self.per_page.clamp(1, MAX_PER_PAGE)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
  Commits,
  /// Issues and pull requests share one search endpoint.
  Issues,
}

impl SearchKind {
  fn path(self) -> &'static str {
    match self {
      SearchKind::Commits => "/search/commits",
      SearchKind::Issues => "/search/issues",
    }
  }
}

#[async_trait]
pub trait GithubApi: Send + Sync {
  async fn list_commits(&self, repo: &RepoRef, params: &ListParams) -> Result<Value>;
  async fn list_pull_requests(&self, repo: &RepoRef, params: &ListParams) -> Result<Value>;
  async fn list_issues(&self, repo: &RepoRef, params: &ListParams) -> Result<Value>;
  async fn list_pull_reviews(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value>;
  async fn list_pull_files(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value>;
  async fn list_pull_comments(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value>;
  async fn list_issue_comments(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value>;
  async fn search(&self, kind: SearchKind, query: &str, per_page: usize) -> Result<Value>;
}

fn iso(dt: &DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Live backend over the REST API using a shared `ureq` agent.
pub struct GithubHttpApi {
  agent: ureq::Agent,
  base_url: String,
  token: Option<String>,
}

impl GithubHttpApi {
  pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .timeout_global(Some(std::time::Duration::from_secs(30)))
      .build()
      .into();

    Self {
      agent,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      token,
    }
  }

  async fn get_json(&self, path: String, query: Vec<(&'static str, String)>) -> Result<Value> {
    let agent = self.agent.clone();
    let url = format!("{}{}", self.base_url, path);
    let auth = self.token.as_ref().map(|t| format!("Bearer {}", t));

    tokio::task::spawn_blocking(move || {
      let mut req = agent
        .get(&url)
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", USER_AGENT)
        .header("X-GitHub-Api-Version", "2022-11-28");

      if let Some(a) = &auth {
        req = req.header("Authorization", a);
      }

      for (k, v) in &query {
        req = req.query(k, v);
      }

      let mut resp = req.call().with_context(|| format!("GET {}", url))?;

      resp
        .body_mut()
        .read_json::<Value>()
        .with_context(|| format!("decoding JSON from {}", url))
    })
    .await
    .context("GitHub request worker failed")?
  }

  fn repo_path(repo: &RepoRef, rest: &str) -> String {
    format!("/repos/{}/{}{}", repo.owner, repo.name, rest)
  }
}

#[async_trait]
impl GithubApi for GithubHttpApi {
  async fn list_commits(&self, repo: &RepoRef, params: &ListParams) -> Result<Value> {
    let mut q = vec![("per_page", params.page_size().to_string())];

    if let Some(b) = &params.branch {
      q.push(("sha", b.clone()));
    }
    if let Some(s) = &params.since {
      q.push(("since", iso(s)));
    }
    if let Some(u) = &params.until {
      q.push(("until", iso(u)));
    }
    if let Some(a) = &params.author {
      q.push(("author", a.clone()));
    }

    self.get_json(Self::repo_path(repo, "/commits"), q).await
  }

  async fn list_pull_requests(&self, repo: &RepoRef, params: &ListParams) -> Result<Value> {
    // The listing has no created-at filter; sorting by update keeps the window near the top.
    let q = vec![
      ("state", "all".to_string()),
      ("sort", "updated".to_string()),
      ("direction", "desc".to_string()),
      ("per_page", params.page_size().to_string()),
    ];
    self.get_json(Self::repo_path(repo, "/pulls"), q).await
  }

  async fn list_issues(&self, repo: &RepoRef, params: &ListParams) -> Result<Value> {
    let mut q = vec![
      ("state", "all".to_string()),
      ("per_page", params.page_size().to_string()),
    ];

    // `since` here filters on update time, not creation.
    if let Some(s) = &params.since {
      q.push(("since", iso(s)));
    }
    if let Some(a) = &params.author {
      q.push(("creator", a.clone()));
    }

    self.get_json(Self::repo_path(repo, "/issues"), q).await
  }

  async fn list_pull_reviews(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value> {
    let q = vec![("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string())];
    self.get_json(Self::repo_path(repo, &format!("/pulls/{}/reviews", number)), q).await
  }

  async fn list_pull_files(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value> {
    let q = vec![("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string())];
    self.get_json(Self::repo_path(repo, &format!("/pulls/{}/files", number)), q).await
  }

  async fn list_pull_comments(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value> {
    let q = vec![("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string())];
    self.get_json(Self::repo_path(repo, &format!("/pulls/{}/comments", number)), q).await
  }

  async fn list_issue_comments(&self, repo: &RepoRef, number: u64, per_page: usize) -> Result<Value> {
    let q = vec![("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string())];
    self.get_json(Self::repo_path(repo, &format!("/issues/{}/comments", number)), q).await
  }

  async fn search(&self, kind: SearchKind, query: &str, per_page: usize) -> Result<Value> {
    let q = vec![
      ("q", query.to_string()),
      ("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string()),
    ];
    self.get_json(kind.path().to_string(), q).await
  }
}

const FIXTURE_VARS: &[&str] = &[
  "GHA_TEST_COMMITS_JSON",
  "GHA_TEST_PULLS_JSON",
  "GHA_TEST_ISSUES_JSON",
  "GHA_TEST_REVIEWS_JSON",
  "GHA_TEST_FILES_JSON",
  "GHA_TEST_PR_COMMENTS_JSON",
  "GHA_TEST_ISSUE_COMMENTS_JSON",
  "GHA_TEST_SEARCH_COMMITS_JSON",
  "GHA_TEST_SEARCH_ISSUES_JSON",
];

/// Fixture backend: each endpoint answers with the JSON held in its `GHA_TEST_*_JSON` variable.
///
/// A missing variable answers `[]` (or an empty search page). `GHA_TEST_FAIL_PULLS`
/// lists PR/issue numbers (comma separated) whose secondary endpoints fail.
pub struct GithubEnvApi;

impl GithubEnvApi {
  fn read(var: &str, empty: Value) -> Result<Value> {
    match std::env::var(var) {
      Ok(s) => serde_json::from_str::<Value>(&s).with_context(|| format!("parsing fixture {}", var)),
      Err(_) => Ok(empty),
    }
  }

  fn secondary(var: &str, number: u64) -> Result<Value> {
    let failing = std::env::var("GHA_TEST_FAIL_PULLS").unwrap_or_default();

    if failing.split(',').any(|n| n.trim() == number.to_string()) {
      anyhow::bail!("fixture failure for #{}", number);
    }

    Self::read(var, serde_json::json!([]))
  }
}

#[async_trait]
impl GithubApi for GithubEnvApi {
  async fn list_commits(&self, _repo: &RepoRef, _params: &ListParams) -> Result<Value> {
    Self::read("GHA_TEST_COMMITS_JSON", serde_json::json!([]))
  }

  async fn list_pull_requests(&self, _repo: &RepoRef, _params: &ListParams) -> Result<Value> {
    Self::read("GHA_TEST_PULLS_JSON", serde_json::json!([]))
  }

  async fn list_issues(&self, _repo: &RepoRef, _params: &ListParams) -> Result<Value> {
    Self::read("GHA_TEST_ISSUES_JSON", serde_json::json!([]))
  }

  async fn list_pull_reviews(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    Self::secondary("GHA_TEST_REVIEWS_JSON", number)
  }

  async fn list_pull_files(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    Self::secondary("GHA_TEST_FILES_JSON", number)
  }

  async fn list_pull_comments(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    Self::secondary("GHA_TEST_PR_COMMENTS_JSON", number)
  }

  async fn list_issue_comments(&self, _repo: &RepoRef, number: u64, _per_page: usize) -> Result<Value> {
    Self::secondary("GHA_TEST_ISSUE_COMMENTS_JSON", number)
  }

  async fn search(&self, kind: SearchKind, _query: &str, _per_page: usize) -> Result<Value> {
    let var = match kind {
      SearchKind::Commits => "GHA_TEST_SEARCH_COMMITS_JSON",
      SearchKind::Issues => "GHA_TEST_SEARCH_ISSUES_JSON",
    };
    Self::read(var, serde_json::json!({ "total_count": 0, "items": [] }))
  }
}

pub fn env_wants_fixtures() -> bool {
  FIXTURE_VARS.iter().any(|v| std::env::var(v).is_ok())
}

/// Pick the backend: fixtures when requested by env, otherwise HTTP (token optional).
pub fn build_api(token: Option<String>) -> Arc<dyn GithubApi> {
  if env_wants_fixtures() {
    return Arc::new(GithubEnvApi);
  }

  let base_url = std::env::var("GITHUB_API_URL")
    .ok()
    .filter(|u| !u.trim().is_empty())
    .unwrap_or_else(|| DEFAULT_API_URL.to_string());

  Arc::new(GithubHttpApi::new(base_url, token))
}
