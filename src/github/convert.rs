// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Map GitHub REST and search JSON into model values
// role: integration/mapping
// inputs: serde_json::Value payloads from github::api
// outputs: Commit, PullRequest, Issue, Review, FileChange, Comment
// invariants:
// - Records missing their identity (sha / number) or creation time are dropped, never defaulted
// - Issue listings: records carrying a `pull_request` key are pull requests, not issues
// - Search results take merged_at from `pull_request.merged_at` and repository from `repository_url`
// errors: None; mapping is total and tolerant
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::ext::serde_json::JsonFetch;
use crate::github::RepoRef;
use crate::model::{Comment, Commit, CommitAuthor, FileChange, Issue, ItemState, PullRequest, Review};

/// Search endpoints wrap results in `{ "items": [...] }`; listings are bare arrays.
pub fn result_items(v: &Value) -> &[Value] {
  if v.is_array() {
    v.fetch("").items()
  } else {
    v.fetch("items").items()
  }
}

/// Whether an issues-endpoint record is really a pull request.
pub fn is_pull_request_record(v: &Value) -> bool {
  v.fetch("pull_request").exists()
}

fn repository_of(v: &Value) -> Option<String> {
  v.fetch("repository.full_name")
    .text()
    .or_else(|| v.fetch("base.repo.full_name").text())
    .or_else(|| {
      v.fetch("repository_url")
        .text()
        .and_then(|u| RepoRef::from_api_url(&u))
        .map(|r| r.slug())
    })
}

fn labels_of(v: &Value) -> Vec<String> {
  v.fetch("labels")
    .items()
    .iter()
    .filter_map(|l| l.fetch("name").text())
    .collect()
}

pub fn commit_from_json(v: &Value) -> Option<Commit> {
  let sha = v.fetch("sha").text()?;
  let timestamp = v
    .fetch("commit.author.date")
    .to::<DateTime<Utc>>()
    .or_else(|| v.fetch("commit.committer.date").to::<DateTime<Utc>>())?;

  let author = CommitAuthor {
    login: v.fetch("author.login").text(),
    name: v.fetch("commit.author.name").text(),
    email: v.fetch("commit.author.email").text(),
    committer_name: v.fetch("commit.committer.name").text(),
  };

  Some(Commit {
    sha,
    message: v.fetch("commit.message").to_or_default::<String>(),
    author,
    timestamp,
    html_url: v.fetch("html_url").text(),
    repository: repository_of(v),
  })
}

pub fn pull_request_from_json(v: &Value) -> Option<PullRequest> {
  let number = v.fetch("number").to::<u64>()?;
  let created_at = v.fetch("created_at").to::<DateTime<Utc>>()?;
  let merged_at = v
    .fetch("merged_at")
    .to::<DateTime<Utc>>()
    .or_else(|| v.fetch("pull_request.merged_at").to::<DateTime<Utc>>());

  Some(PullRequest {
    number,
    title: v.fetch("title").to_or_default::<String>(),
    state: ItemState::from_api(&v.fetch("state").to_or_default::<String>()),
    author: v.fetch("user.login").text(),
    created_at,
    merged_at,
    closed_at: v.fetch("closed_at").to::<DateTime<Utc>>(),
    merge_commit_sha: v.fetch("merge_commit_sha").text(),
    labels: labels_of(v),
    html_url: v.fetch("html_url").text(),
    repository: repository_of(v),
    enrichment: None,
  })
}

pub fn issue_from_json(v: &Value) -> Option<Issue> {
  if is_pull_request_record(v) {
    return None;
  }

  let number = v.fetch("number").to::<u64>()?;
  let created_at = v.fetch("created_at").to::<DateTime<Utc>>()?;

  Some(Issue {
    number,
    title: v.fetch("title").to_or_default::<String>(),
    state: ItemState::from_api(&v.fetch("state").to_or_default::<String>()),
    author: v.fetch("user.login").text(),
    created_at,
    closed_at: v.fetch("closed_at").to::<DateTime<Utc>>(),
    labels: labels_of(v),
    comments_total: v.fetch("comments").to::<u64>(),
    html_url: v.fetch("html_url").text(),
    repository: repository_of(v),
    enrichment: None,
  })
}

pub fn review_from_json(v: &Value) -> Review {
  Review {
    reviewer: v.fetch("user.login").text(),
    state: v.fetch("state").to_or_default::<String>().to_ascii_uppercase(),
    submitted_at: v.fetch("submitted_at").to::<DateTime<Utc>>(),
    body: v.fetch("body").text(),
  }
}

pub fn file_from_json(v: &Value) -> Option<FileChange> {
  let additions = v.fetch("additions").to_or_default::<u64>();
  let deletions = v.fetch("deletions").to_or_default::<u64>();

  Some(FileChange {
    filename: v.fetch("filename").text()?,
    status: v.fetch("status").to_or_default::<String>(),
    additions,
    deletions,
    changes: v.fetch("changes").to::<u64>().unwrap_or(additions + deletions),
  })
}

pub fn comment_from_json(v: &Value) -> Comment {
  Comment {
    author: v.fetch("user.login").text(),
    body: v.fetch("body").to_or_default::<String>(),
    created_at: v.fetch("created_at").to::<DateTime<Utc>>(),
  }
}
