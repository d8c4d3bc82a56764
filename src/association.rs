// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Heuristically link each commit to the pull request that most plausibly introduced it
// role: processing/association
// inputs: Commits, candidate pull requests, a pinned "now"
// outputs: EnrichedCommit values carrying at most one PullRequestRef
// invariants:
// - Strategies run in order; within a strategy, candidates run in input order; first match wins
// - A merge-commit sha match beats every other candidate
// - The temporal strategy requires BOTH time containment AND a textual reference
// - Squash merges whose merge sha never appears on the branch stay unassociated
// errors: None; pure computation
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};

use crate::model::{Commit, EnrichedCommit, PullRequest};

/// Length of the lowercase title prefix accepted as a textual reference.
pub const TITLE_PREFIX_CHARS: usize = 20;

/// A single association rule.
pub type Strategy = fn(&Commit, &PullRequest, DateTime<Utc>) -> bool;

/// Ordered rules; earlier entries are authoritative over later ones.
pub const STRATEGIES: &[(&str, Strategy)] = &[
  ("merge_commit_sha", matches_merge_sha),
  ("timeframe_and_reference", matches_timeframe_and_reference),
];

/// Commit sha equals the PR's recorded merge-commit sha.
pub fn matches_merge_sha(commit: &Commit, pr: &PullRequest, _now: DateTime<Utc>) -> bool {
  pr.merge_commit_sha
    .as_deref()
    .map(|sha| !sha.is_empty() && sha.eq_ignore_ascii_case(&commit.sha))
    .unwrap_or(false)
}

/// Commit time within `[created, merged-or-now]` and the message references the PR.
pub fn matches_timeframe_and_reference(commit: &Commit, pr: &PullRequest, now: DateTime<Utc>) -> bool {
  let end = pr.merged_at.unwrap_or(now);
  let in_window = commit.timestamp >= pr.created_at && commit.timestamp <= end;

  in_window && message_references(&commit.message, pr)
}

/// `#<n>`, `pull/<n>`, or the lowercase first characters of the title.
pub fn message_references(message: &str, pr: &PullRequest) -> bool {
  let number = pr.number.to_string();

  if contains_number_ref(message, "#", &number) || contains_number_ref(message, "pull/", &number) {
    return true;
  }

  let prefix: String = pr.title.to_lowercase().chars().take(TITLE_PREFIX_CHARS).collect();
  let prefix = prefix.trim();

  !prefix.is_empty() && message.to_lowercase().contains(prefix)
}

// `#7` must not match inside `#70`.
fn contains_number_ref(message: &str, marker: &str, number: &str) -> bool {
  let needle = format!("{}{}", marker, number);

  message.match_indices(&needle).any(|(idx, _)| {
    message[idx + needle.len()..]
      .chars()
      .next()
      .map(|c| !c.is_ascii_digit())
      .unwrap_or(true)
  })
}

/// Find at most one pull request for `commit`.
pub fn find_pull_request<'a>(
  commit: &Commit,
  pull_requests: &'a [PullRequest],
  now: DateTime<Utc>,
) -> Option<&'a PullRequest> {
  STRATEGIES.iter().find_map(|(_, strategy)| {
    pull_requests.iter().find(|pr| strategy(commit, pr, now))
  })
}

/// Attach the matching pull request (if any) to every commit.
pub fn associate_commits(
  commits: Vec<Commit>,
  pull_requests: &[PullRequest],
  now: DateTime<Utc>,
) -> Vec<EnrichedCommit> {
  commits
    .into_iter()
    .map(|commit| {
      let pull_request = find_pull_request(&commit, pull_requests, now).map(PullRequest::as_ref_for_commit);
      EnrichedCommit {
        commit,
        pull_request,
        enrichment: None,
      }
    })
    .collect()
}
