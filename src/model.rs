// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the activity report model (commits, pull requests, issues, rollups) shared by every pipeline stage
// role: model/types
// outputs: Serializable result values; enrichment carried as explicit optional substructures
// invariants:
// - An EnrichedCommit references at most one pull request
// - `merged` is derived from `merged_at`, never stored as a flag
// - Values are built once per pipeline run and never mutated afterwards
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
  Open,
  Closed,
}

impl ItemState {
  /// GitHub reports `open`/`closed`; anything unrecognised is treated as closed.
  pub fn from_api(s: &str) -> Self {
    if s.eq_ignore_ascii_case("open") {
      ItemState::Open
    } else {
      ItemState::Closed
    }
  }
}

/// Identity of a commit author as reported by the platform and by git itself.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CommitAuthor {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub login: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub committer_name: Option<String>,
}

impl CommitAuthor {
  /// Platform login, then git author name, then git author email, then committer name.
  pub fn display_name(&self) -> &str {
    [&self.login, &self.name, &self.email, &self.committer_name]
      .into_iter()
      .flatten()
      .map(|s| s.trim())
      .find(|s| !s.is_empty())
      .unwrap_or("Unknown")
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Commit {
  pub sha: String,
  pub message: String,
  pub author: CommitAuthor,
  pub timestamp: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  /// `owner/name` the commit came from (cross-repository search results).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repository: Option<String>,
}

impl Commit {
  pub fn short_sha(&self) -> &str {
    self.sha.get(..7).unwrap_or(&self.sha)
  }

  pub fn subject(&self) -> &str {
    self.message.lines().next().unwrap_or("")
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Review {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reviewer: Option<String>,
  /// Upstream review state, e.g. APPROVED, CHANGES_REQUESTED, COMMENTED.
  pub state: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub submitted_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileChange {
  pub filename: String,
  pub status: String,
  pub additions: u64,
  pub deletions: u64,
  pub changes: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Comment {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  pub body: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

/// Review timing and outcome derived from an enriched pull request.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ReviewMetrics {
  pub review_count: usize,
  pub approval_count: usize,
  pub change_request_count: usize,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub reviewers: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub approver: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub time_to_first_review_seconds: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub time_to_merge_seconds: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PullRequestEnrichment {
  pub reviews: Vec<Review>,
  pub files: Vec<FileChange>,
  pub comments: Vec<Comment>,
  pub additions: u64,
  pub deletions: u64,
  pub metrics: ReviewMetrics,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub state: ItemState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merged_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub closed_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub merge_commit_sha: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub labels: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repository: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub enrichment: Option<PullRequestEnrichment>,
}

impl PullRequest {
  pub fn is_merged(&self) -> bool {
    self.merged_at.is_some()
  }

  pub fn as_ref_for_commit(&self) -> PullRequestRef {
    PullRequestRef {
      number: self.number,
      title: self.title.clone(),
      state: self.state,
      merged: self.is_merged(),
      html_url: self.html_url.clone(),
      repository: self.repository.clone(),
    }
  }
}

/// Lightweight pointer from a commit to the pull request that introduced it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PullRequestRef {
  pub number: u64,
  pub title: String,
  pub state: ItemState,
  pub merged: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repository: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IssueEnrichment {
  pub comments: Vec<Comment>,
  pub comment_count: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Issue {
  pub number: u64,
  pub title: String,
  pub state: ItemState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub closed_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub labels: Vec<String>,
  /// Comment total reported by the listing, when present.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comments_total: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub repository: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub enrichment: Option<IssueEnrichment>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommitEnrichment {
  pub reviews: Vec<Review>,
  pub files: Vec<FileChange>,
}

/// A commit composed with its (optional) pull request and (optional) detail.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnrichedCommit {
  #[serde(flatten)]
  pub commit: Commit,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pull_request: Option<PullRequestRef>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub enrichment: Option<CommitEnrichment>,
}

impl EnrichedCommit {
  pub fn files_changed(&self) -> usize {
    self.enrichment.as_ref().map(|e| e.files.len()).unwrap_or(0)
  }

  pub fn lines_changed(&self) -> u64 {
    self
      .enrichment
      .as_ref()
      .map(|e| e.files.iter().map(|f| f.additions + f.deletions).sum())
      .unwrap_or(0)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RankedCount {
  pub name: String,
  pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Statistics {
  pub total_commits: usize,
  pub total_prs: usize,
  pub total_issues: usize,
  pub avg_files_per_commit: f64,
  pub avg_lines_per_commit: f64,
  pub top_contributors: Vec<RankedCount>,
  pub top_labels: Vec<RankedCount>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PullRequestBreakdown {
  pub total: usize,
  pub open: usize,
  pub merged: usize,
  pub closed: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct IssueBreakdown {
  pub total: usize,
  pub open: usize,
  pub closed: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
  pub total_activity: usize,
  pub pull_requests: PullRequestBreakdown,
  pub issues: IssueBreakdown,
  pub top_repositories: Vec<RankedCount>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportWindow {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub since: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub until: Option<DateTime<Utc>>,
}

/// The single value a pipeline run produces.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActivityReport {
  /// `owner/name` for repository runs, `user:<login>` for cross-repository runs.
  pub scope: String,
  pub window: ReportWindow,
  pub generated_at: DateTime<Utc>,
  pub commits: Vec<EnrichedCommit>,
  pub pull_requests: Vec<PullRequest>,
  pub issues: Vec<Issue>,
  pub statistics: Statistics,
  pub summary: ActivitySummary,
}
