// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Primary retrieval of commits, pull requests, and issues for one repository or one user
// role: processing/primary-fetch
// inputs: ActivityRequest (scope, window, author, branch, include flags, limit); GithubClient
// outputs: PrimaryData with each list mapped, post-filtered, and truncated to the limit
// side_effects: Up to three upstream calls, issued concurrently, each funneled through the rate limiter
// invariants:
// - PR and issue listings are filtered client-side by author (case-insensitive) and creation time (inclusive bounds)
// - Records shaped like pull requests never appear in the issue list
// - Excluded kinds (include_* == false) make no upstream call and yield an empty list
// errors: The first failing fetch fails the whole stage; no partial result is returned
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::github::api::{ListParams, SearchKind};
use crate::github::client::GithubClient;
use crate::github::convert;
use crate::model::{Commit, Issue, PullRequest};
use crate::pipeline::{ActivityRequest, ActivityScope};

/// Unassociated, un-enriched results of the primary stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryData {
  pub commits: Vec<Commit>,
  pub pull_requests: Vec<PullRequest>,
  pub issues: Vec<Issue>,
}

pub async fn fetch_primary(client: &GithubClient, request: &ActivityRequest) -> Result<PrimaryData> {
  let (commits, pull_requests, issues) = tokio::try_join!(
    fetch_commits(client, request),
    async {
      if request.include_pull_requests {
        fetch_pull_requests(client, request).await
      } else {
        Ok(Vec::new())
      }
    },
    async {
      if request.include_issues {
        fetch_issues(client, request).await
      } else {
        Ok(Vec::new())
      }
    },
  )?;

  info!(
    scope = %request.scope.label(),
    commits = commits.len(),
    pull_requests = pull_requests.len(),
    issues = issues.len(),
    "primary fetch complete"
  );

  Ok(PrimaryData {
    commits,
    pull_requests,
    issues,
  })
}

fn list_params(request: &ActivityRequest) -> ListParams {
  ListParams {
    since: request.since,
    until: request.until,
    author: request.author.clone(),
    branch: request.branch.clone(),
    per_page: request.limit,
  }
}

async fn fetch_commits(client: &GithubClient, request: &ActivityRequest) -> Result<Vec<Commit>> {
  let raw = match &request.scope {
    ActivityScope::Repository(repo) => client.list_commits(repo, &list_params(request)).await?,
    ActivityScope::User(login) => {
      let query = search_query(login, None, "author-date", request.since, request.until);
      client.search(SearchKind::Commits, &query, request.limit).await?
    }
  };

  let commits: Vec<Commit> = convert::result_items(&raw)
    .iter()
    .filter_map(convert::commit_from_json)
    .filter(|c| within_window(c.timestamp, request.since, request.until))
    .take(request.limit)
    .collect();

  debug!(count = commits.len(), "commits mapped");
  Ok(commits)
}

async fn fetch_pull_requests(client: &GithubClient, request: &ActivityRequest) -> Result<Vec<PullRequest>> {
  let raw = match &request.scope {
    ActivityScope::Repository(repo) => client.list_pull_requests(repo, &list_params(request)).await?,
    ActivityScope::User(login) => {
      let query = search_query(login, Some("is:pr"), "created", request.since, request.until);
      client.search(SearchKind::Issues, &query, request.limit).await?
    }
  };

  Ok(select_pull_requests(&raw, request))
}

async fn fetch_issues(client: &GithubClient, request: &ActivityRequest) -> Result<Vec<Issue>> {
  let raw = match &request.scope {
    ActivityScope::Repository(repo) => client.list_issues(repo, &list_params(request)).await?,
    ActivityScope::User(login) => {
      let query = search_query(login, Some("is:issue"), "created", request.since, request.until);
      client.search(SearchKind::Issues, &query, request.limit).await?
    }
  };

  Ok(select_issues(&raw, request))
}

/// Map a PR listing (or search page) and apply the author/window post-filter.
pub fn select_pull_requests(raw: &Value, request: &ActivityRequest) -> Vec<PullRequest> {
  let author = request.author_filter();
  let cross = request.scope.is_cross_repository();
  let items = convert::result_items(raw);

  let selected: Vec<PullRequest> = items
    .iter()
    .filter(|v| !cross || convert::is_pull_request_record(v))
    .filter_map(convert::pull_request_from_json)
    .filter(|pr| matches_author(pr.author.as_deref(), author))
    .filter(|pr| within_window(pr.created_at, request.since, request.until))
    .take(request.limit)
    .collect();

  debug!(raw = items.len(), kept = selected.len(), "pull requests post-filtered");
  selected
}

/// Map an issue listing (or search page), dropping PR-shaped records, and apply the post-filter.
pub fn select_issues(raw: &Value, request: &ActivityRequest) -> Vec<Issue> {
  let author = request.author_filter();
  let items = convert::result_items(raw);

  let selected: Vec<Issue> = items
    .iter()
    .filter_map(convert::issue_from_json)
    .filter(|i| matches_author(i.author.as_deref(), author))
    .filter(|i| within_window(i.created_at, request.since, request.until))
    .take(request.limit)
    .collect();

  debug!(raw = items.len(), kept = selected.len(), "issues post-filtered");
  selected
}

/// `author:<login> [qualifier] [<field>:<range>]`
pub fn search_query(
  login: &str,
  qualifier: Option<&str>,
  date_field: &str,
  since: Option<DateTime<Utc>>,
  until: Option<DateTime<Utc>>,
) -> String {
  let mut parts = vec![format!("author:{}", login)];

  if let Some(q) = qualifier {
    parts.push(q.to_string());
  }

  let stamp = |dt: DateTime<Utc>| dt.to_rfc3339_opts(SecondsFormat::Secs, true);
  match (since, until) {
    (Some(s), Some(u)) => parts.push(format!("{}:{}..{}", date_field, stamp(s), stamp(u))),
    (Some(s), None) => parts.push(format!("{}:>={}", date_field, stamp(s))),
    (None, Some(u)) => parts.push(format!("{}:<={}", date_field, stamp(u))),
    (None, None) => {}
  }

  parts.join(" ")
}

/// Inclusive on both ends; an absent bound is open.
pub fn within_window(ts: DateTime<Utc>, since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> bool {
  since.map(|s| ts >= s).unwrap_or(true) && until.map(|u| ts <= u).unwrap_or(true)
}

/// Items with no recorded author never match an explicit author filter.
pub fn matches_author(item_author: Option<&str>, wanted: Option<&str>) -> bool {
  match wanted {
    None => true,
    Some(w) => item_author.map(|a| a.eq_ignore_ascii_case(w)).unwrap_or(false),
  }
}
