// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Order-independent rollups (statistics and summary) over the complete fetched result set
// role: processing/rollups
// inputs: All enriched commits, pull requests, issues (never only the enriched subset); fallback repository name
// outputs: Statistics, ActivitySummary
// invariants:
// - Permuting any input list yields identical output
// - Top-N lists rank by count desc, then name asc; at most TOP_N entries
// - Averages divide by the full commit count; un-enriched commits contribute zero
// errors: None; pure computation
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use crate::model::{
  ActivitySummary, EnrichedCommit, Issue, IssueBreakdown, ItemState, PullRequest, PullRequestBreakdown, RankedCount,
  Statistics,
};

pub const TOP_N: usize = 5;

pub fn compute_statistics(commits: &[EnrichedCommit], pull_requests: &[PullRequest], issues: &[Issue]) -> Statistics {
  let total_commits = commits.len();

  let (files, lines) = commits
    .iter()
    .fold((0usize, 0u64), |(f, l), c| (f + c.files_changed(), l + c.lines_changed()));

  let average = |sum: f64| if total_commits == 0 { 0.0 } else { sum / total_commits as f64 };

  let contributors = top_n(commits.iter().map(|c| c.commit.author.display_name()));
  let labels = top_n(
    pull_requests
      .iter()
      .flat_map(|pr| pr.labels.iter())
      .chain(issues.iter().flat_map(|i| i.labels.iter()))
      .map(String::as_str),
  );

  Statistics {
    total_commits,
    total_prs: pull_requests.len(),
    total_issues: issues.len(),
    avg_files_per_commit: average(files as f64),
    avg_lines_per_commit: average(lines as f64),
    top_contributors: contributors,
    top_labels: labels,
  }
}

pub fn build_summary(
  commits: &[EnrichedCommit],
  pull_requests: &[PullRequest],
  issues: &[Issue],
  fallback_repository: &str,
) -> ActivitySummary {
  let mut prs = PullRequestBreakdown {
    total: pull_requests.len(),
    ..PullRequestBreakdown::default()
  };
  for pr in pull_requests {
    match (pr.state, pr.is_merged()) {
      (ItemState::Open, _) => prs.open += 1,
      (ItemState::Closed, true) => prs.merged += 1,
      (ItemState::Closed, false) => prs.closed += 1,
    }
  }

  let mut iss = IssueBreakdown {
    total: issues.len(),
    ..IssueBreakdown::default()
  };
  for issue in issues {
    match issue.state {
      ItemState::Open => iss.open += 1,
      ItemState::Closed => iss.closed += 1,
    }
  }

  let repositories = pull_requests
    .iter()
    .map(|pr| pr.repository.as_deref())
    .chain(issues.iter().map(|i| i.repository.as_deref()))
    .map(|r| r.unwrap_or(fallback_repository));

  ActivitySummary {
    total_activity: commits.len() + pull_requests.len() + issues.len(),
    pull_requests: prs,
    issues: iss,
    top_repositories: top_n(repositories),
  }
}

/// Histogram of `names`, ranked by count desc then name asc, truncated to TOP_N.
pub fn top_n<'a>(names: impl Iterator<Item = &'a str>) -> Vec<RankedCount> {
  let mut counts: HashMap<&str, usize> = HashMap::new();
  for n in names {
    *counts.entry(n).or_default() += 1;
  }

  let mut ranked: Vec<RankedCount> = counts
    .into_iter()
    .map(|(name, count)| RankedCount {
      name: name.to_string(),
      count,
    })
    .collect();
  ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
  ranked.truncate(TOP_N);
  ranked
}
